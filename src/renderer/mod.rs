//! Renderer abstraction for browser-based network capture.
//!
//! Defines the `Renderer` and `CaptureSession` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). A session
//! navigates to one page, records the network exchanges the page makes,
//! and can fetch any captured response body over the debugging protocol.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// One captured network exchange.
///
/// Holds the CDP request id, the response URL, and the full event
/// serialized to JSON so content-based scans can run over the raw text.
#[derive(Debug, Clone)]
pub struct NetworkEvent {
    /// CDP request identifier, used to fetch the response body.
    pub request_id: String,
    /// URL the response was served from.
    pub url: String,
    raw: String,
}

impl NetworkEvent {
    pub fn new(
        request_id: impl Into<String>,
        url: impl Into<String>,
        raw: serde_json::Value,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            url: url.into(),
            raw: raw.to_string(),
        }
    }

    /// The event serialized to JSON text.
    pub fn serialized(&self) -> &str {
        &self.raw
    }

    /// Whether the serialized event contains the marker substring.
    pub fn matches(&self, marker: &str) -> bool {
        self.raw.contains(marker)
    }
}

/// A browser engine that can create capture sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new capture session (tab).
    async fn new_session(&self) -> Result<Box<dyn CaptureSession>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser session that records network traffic for one page load.
#[async_trait]
pub trait CaptureSession: Send {
    /// Navigate to a URL and return the network exchanges the page made,
    /// in the order they completed.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<Vec<NetworkEvent>>;
    /// Fetch the response body for a captured exchange.
    ///
    /// Returns `None` when the body is empty or absent.
    async fn response_body(&self, request_id: &str) -> Result<Option<String>>;
    /// Close this session.
    async fn close(self: Box<Self>) -> Result<()>;
}
