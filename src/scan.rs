//! Network log scanner.
//!
//! Selects the exchange that carries the product catalog out of a page's
//! captured network log. The site serves the catalog through a WordPress
//! admin-ajax endpoint, so the scan picks the first event whose serialized
//! form contains the marker substring (default `"admin"`).
//!
//! This is a content heuristic, not a stable identifier, and it is fragile
//! by nature: any unrelated exchange mentioning the marker earlier in the
//! log wins. The marker is overridable so a structural URL match can be
//! approximated (e.g. `"admin-ajax.php"`) without a code change.

use crate::renderer::NetworkEvent;
use thiserror::Error;

/// Default marker substring identifying the catalog exchange.
pub const DEFAULT_MARKER: &str = "admin";

#[derive(Debug, Error)]
pub enum ScanError {
    /// No captured exchange matched the marker. Fatal for the whole run:
    /// the page layout or endpoint changed and every region would miss.
    #[error("no network event matched marker {marker:?} among {scanned} captured events")]
    NoCatalogRequest { marker: String, scanned: usize },
}

/// Find the first captured exchange whose serialized form contains the
/// marker substring.
pub fn find_catalog_event<'a>(
    events: &'a [NetworkEvent],
    marker: &str,
) -> Result<&'a NetworkEvent, ScanError> {
    events
        .iter()
        .find(|event| event.matches(marker))
        .ok_or_else(|| ScanError::NoCatalogRequest {
            marker: marker.to_string(),
            scanned: events.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(request_id: &str, url: &str) -> NetworkEvent {
        NetworkEvent::new(
            request_id,
            url,
            json!({"requestId": request_id, "response": {"url": url}}),
        )
    }

    #[test]
    fn test_first_match_wins() {
        let events = vec![
            event("1", "https://site.test/style.css"),
            event("2", "https://site.test/wp-admin/admin-ajax.php"),
            event("3", "https://site.test/wp-admin/admin-ajax.php?page=2"),
        ];
        let found = find_catalog_event(&events, DEFAULT_MARKER).unwrap();
        assert_eq!(found.request_id, "2");
    }

    #[test]
    fn test_no_match_is_an_error() {
        let events = vec![event("1", "https://site.test/logo.png")];
        let err = find_catalog_event(&events, DEFAULT_MARKER).unwrap_err();
        assert!(matches!(
            err,
            ScanError::NoCatalogRequest { scanned: 1, .. }
        ));
    }

    #[test]
    fn test_empty_log_is_an_error() {
        assert!(find_catalog_event(&[], DEFAULT_MARKER).is_err());
    }
}
