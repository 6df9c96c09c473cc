//! Product URL and category resolution.
//!
//! A product's category is not in the catalog payload; it only shows up in
//! the path the canonical product URL redirects to. The resolver issues
//! one GET per product, follows the redirect, and derives the category
//! from the residual path. Results are a pure function of
//! `(post_type, product_name)`, so they are memoized — duplicate products
//! across regions cost one request total.

use crate::region::SITE_BASE;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Resolved product location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical product URL (`{base}{post_type}/{product_name}/`).
    pub product_url: String,
    /// Residual path after stripping base, type segment, and name segment
    /// from the redirect target.
    pub category: String,
}

/// HTTP resolver with a memoization cache keyed by
/// `(post_type, product_name)`.
pub struct CategoryResolver {
    client: reqwest::Client,
    base: String,
    cache: Mutex<HashMap<(String, String), Resolution>>,
}

impl CategoryResolver {
    pub fn new(timeout_ms: u64) -> Self {
        Self::with_base(SITE_BASE.to_string(), timeout_ms)
    }

    /// Resolver rooted at an arbitrary base URL (must end with `/`).
    pub fn with_base(base: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve one product. Request failures propagate; there is no retry.
    pub async fn resolve(&self, post_type: &str, product_name: &str) -> Result<Resolution> {
        let key = (post_type.to_string(), product_name.to_string());
        if let Some(hit) = self
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&key).cloned())
        {
            tracing::debug!("category cache hit for {post_type}/{product_name}");
            return Ok(hit);
        }

        let product_url = format!("{}{}/{}/", self.base, post_type, product_name);
        let response = self
            .client
            .get(&product_url)
            .send()
            .await
            .with_context(|| format!("category lookup failed: {product_url}"))?;
        let final_url = response.url().to_string();

        let resolution = Resolution {
            category: derive_category(&final_url, &self.base, post_type, product_name),
            product_url,
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, resolution.clone());
        }
        Ok(resolution)
    }

    /// Resolve a batch with bounded concurrency, preserving input order.
    ///
    /// `None` entries (products without type or name) pass through as
    /// `None`. Any request error fails the whole batch.
    pub async fn resolve_all(
        &self,
        pairs: &[Option<(String, String)>],
        concurrency: usize,
    ) -> Result<Vec<Option<Resolution>>> {
        let results: Vec<Result<Option<Resolution>>> = stream::iter(pairs.iter().cloned())
            .map(|pair| async move {
                match pair {
                    Some((post_type, name)) => Ok(Some(self.resolve(&post_type, &name).await?)),
                    None => Ok(None),
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        results.into_iter().collect()
    }
}

/// Derive the category from a redirect-resolved product URL.
///
/// Percent characters are stripped first, then the site base, the
/// `{post_type}/` segment, and the `{product_name}/` segment; whatever
/// path remains is the category (possibly empty).
pub fn derive_category(final_url: &str, base: &str, post_type: &str, product_name: &str) -> String {
    let cleaned: String = final_url.chars().filter(|c| *c != '%').collect();
    let rest = cleaned.strip_prefix(base).unwrap_or(&cleaned);
    let rest = rest.replacen(&format!("{post_type}/"), "", 1);
    rest.replacen(&format!("{product_name}/"), "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_derive_category_from_redirect_target() {
        let category = derive_category(
            "https://aratiendas.com/producto/leche-entera/lacteos/",
            "https://aratiendas.com/",
            "producto",
            "leche-entera",
        );
        assert_eq!(category, "lacteos/");
    }

    #[test]
    fn test_derive_category_without_redirect_is_empty() {
        let category = derive_category(
            "https://aratiendas.com/producto/pan-tajado/",
            "https://aratiendas.com/",
            "producto",
            "pan-tajado",
        );
        assert_eq!(category, "");
    }

    #[test]
    fn test_derive_category_strips_percent_encoding() {
        let category = derive_category(
            "https://aratiendas.com/producto/caf%C3%A9/bebidas/",
            "https://aratiendas.com/",
            "producto",
            "cafC3A9",
        );
        assert_eq!(category, "bebidas/");
    }

    #[tokio::test]
    async fn test_resolve_follows_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/producto/leche-entera/"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "location",
                format!("{}/producto/leche-entera/lacteos/", server.uri()).as_str(),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/producto/leche-entera/lacteos/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let resolver = CategoryResolver::with_base(format!("{}/", server.uri()), 5000);
        let resolution = resolver.resolve("producto", "leche-entera").await.unwrap();
        assert_eq!(resolution.category, "lacteos/");
        assert_eq!(
            resolution.product_url,
            format!("{}/producto/leche-entera/", server.uri())
        );
    }

    #[tokio::test]
    async fn test_resolve_memoizes_repeat_lookups() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/producto/pan-tajado/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = CategoryResolver::with_base(format!("{}/", server.uri()), 5000);
        let first = resolver.resolve("producto", "pan-tajado").await.unwrap();
        let second = resolver.resolve("producto", "pan-tajado").await.unwrap();
        assert_eq!(first, second);
        // wiremock verifies the expect(1) on drop
    }

    #[tokio::test]
    async fn test_resolve_all_preserves_order_and_gaps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let resolver = CategoryResolver::with_base(format!("{}/", server.uri()), 5000);
        let pairs = vec![
            Some(("producto".to_string(), "a".to_string())),
            None,
            Some(("producto".to_string(), "b".to_string())),
        ];
        let resolutions = resolver.resolve_all(&pairs, 2).await.unwrap();
        assert_eq!(resolutions.len(), 3);
        assert!(resolutions[0].as_ref().unwrap().product_url.ends_with("/producto/a/"));
        assert!(resolutions[1].is_none());
        assert!(resolutions[2].as_ref().unwrap().product_url.ends_with("/producto/b/"));
    }
}
