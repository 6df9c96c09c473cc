//! The extraction pipeline: region loop, network scan, decode, normalize,
//! aggregate.
//!
//! Regions are processed strictly in order. Each region gets a fresh
//! capture session; an empty catalog body skips the region silently while
//! a missing catalog exchange aborts the whole run.

use crate::catalog::decode_catalog;
use crate::normalize::{ExtractionStamp, ProductRecord};
use crate::region::Region;
use crate::renderer::Renderer;
use crate::resolver::CategoryResolver;
use crate::scan::{find_catalog_event, DEFAULT_MARKER};
use crate::table::ResultTable;
use anyhow::Result;
use tracing::{debug, info};

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Substring identifying the catalog exchange in the network log.
    pub marker: String,
    /// Navigation and capture budget per region, in milliseconds.
    pub navigate_timeout_ms: u64,
    /// In-flight category lookups per region.
    pub resolve_concurrency: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            navigate_timeout_ms: 30_000,
            resolve_concurrency: 4,
        }
    }
}

/// Run the full extraction over the given regions and return one
/// concatenated table, rows in region-then-discovery order.
pub async fn scrape(
    renderer: &dyn Renderer,
    resolver: &CategoryResolver,
    regions: &[Region],
    opts: &ScrapeOptions,
) -> Result<ResultTable> {
    let stamp = ExtractionStamp::now();
    info!("extracting products on {}", stamp.date);

    let mut tables = Vec::new();
    for region in regions {
        if let Some(table) = scrape_region(renderer, resolver, region, &stamp, opts).await? {
            tables.push(table);
        }
    }

    let all = ResultTable::concat(tables);
    info!("extraction finished: {} rows total", all.len());
    Ok(all)
}

async fn scrape_region(
    renderer: &dyn Renderer,
    resolver: &CategoryResolver,
    region: &Region,
    stamp: &ExtractionStamp,
    opts: &ScrapeOptions,
) -> Result<Option<ResultTable>> {
    let url = region.catalog_url();
    info!("processing region {region}: {url}");

    let mut session = renderer.new_session().await?;
    let events = session.navigate(&url, opts.navigate_timeout_ms).await?;
    let catalog_event = find_catalog_event(&events, &opts.marker)?;
    debug!(
        "region {region}: catalog exchange {} at {}",
        catalog_event.request_id, catalog_event.url
    );

    let body = session.response_body(&catalog_event.request_id).await?;
    session.close().await?;

    let Some(body) = body else {
        info!("region {region}: empty catalog body, skipping");
        return Ok(None);
    };

    let raw_products = decode_catalog(&body)?;
    info!("region {region}: {} products", raw_products.len());

    let mut records: Vec<ProductRecord> = raw_products
        .iter()
        .map(|raw| ProductRecord::from_raw(raw, region, stamp))
        .collect();

    // Category needs one redirect-resolving request per distinct product.
    let pairs: Vec<Option<(String, String)>> = records
        .iter()
        .map(|r| r.post_type.clone().zip(r.product_name.clone()))
        .collect();
    let resolutions = resolver
        .resolve_all(&pairs, opts.resolve_concurrency)
        .await?;

    let mut table = ResultTable::new();
    for (mut record, resolution) in records.drain(..).zip(resolutions) {
        if let Some(resolution) = resolution {
            record.product_url = Some(resolution.product_url);
            record.category = Some(resolution.category);
        }
        table.push(record);
    }
    Ok(Some(table))
}
