use anyhow::{Context, Result};
use clap::Parser;
use rebajon::pipeline::{scrape, ScrapeOptions};
use rebajon::region::{default_named_regions, Region};
use rebajon::renderer::chromium::ChromiumRenderer;
use rebajon::renderer::Renderer;
use rebajon::resolver::CategoryResolver;
use rebajon::scan::DEFAULT_MARKER;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rebajon",
    about = "Extract the Ara retail catalog by intercepting the pages' network traffic",
    version,
    after_help = "Rows are written as CSV to stdout unless --output is given.\nA .json output extension switches the sink to JSON."
)]
struct Cli {
    /// Named regions to scrape (default: norte, sur, oriente, occidente, centro)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// Skip the unfiltered national pass
    #[arg(long)]
    skip_national: bool,

    /// Output file (.csv or .json); CSV to stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Substring identifying the catalog exchange in the network log
    #[arg(long, default_value = DEFAULT_MARKER)]
    marker: String,

    /// Navigation and capture budget per region, in milliseconds
    #[arg(long, default_value = "30000")]
    timeout: u64,

    /// In-flight category lookups per region
    #[arg(long, default_value = "4")]
    resolve_concurrency: usize,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        if !self.skip_national {
            regions.push(Region::National);
        }
        if self.regions.is_empty() {
            regions.extend(default_named_regions());
        } else {
            regions.extend(self.regions.iter().cloned().map(Region::Named));
        }
        regions
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("rebajon=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let regions = cli.regions();
    let opts = ScrapeOptions {
        marker: cli.marker.clone(),
        navigate_timeout_ms: cli.timeout,
        resolve_concurrency: cli.resolve_concurrency,
    };

    let renderer = ChromiumRenderer::new().await?;
    let resolver = CategoryResolver::new(cli.timeout);

    let table = scrape(&renderer, &resolver, &regions, &opts).await?;
    renderer.shutdown().await?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                table.write_json(file)?;
            } else {
                table.write_csv(file)?;
            }
            info!("wrote {} rows to {}", table.len(), path.display());
        }
        None => {
            table.write_csv(std::io::stdout().lock())?;
        }
    }

    Ok(())
}
