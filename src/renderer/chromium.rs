//! Chromium-based capture session using chromiumoxide.

use super::{CaptureSession, NetworkEvent, Renderer};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long the capture stream may stay quiet before the network log is
/// considered complete.
const CAPTURE_IDLE_MS: u64 = 750;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. ARA_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("ARA_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer. Launches one headless browser process per run;
/// each region gets a fresh session (tab) from it.
pub struct ChromiumRenderer {
    browser: Browser,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance configured for containerized
    /// execution.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Install it or set ARA_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_session(&self) -> Result<Box<dyn CaptureSession>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumSession { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser process exits when ChromiumRenderer is dropped
        Ok(())
    }
}

/// A single Chromium page with network capture enabled.
pub struct ChromiumSession {
    page: Page,
}

#[async_trait]
impl CaptureSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<Vec<NetworkEvent>> {
        // The Network domain must be on before navigation or response
        // bodies are not retained by the browser.
        self.page
            .execute(EnableParams::default())
            .await
            .context("failed to enable network capture")?;

        let mut events = Box::pin(
            self.page
                .event_listener::<EventResponseReceived>()
                .await
                .context("failed to attach network listener")?,
        );

        let started = Instant::now();
        tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await
            .map_err(|_| anyhow!("navigation timed out after {timeout_ms}ms"))?
            .with_context(|| format!("navigation failed: {url}"))?;
        let _ = self.page.wait_for_navigation().await;

        // Drain the capture stream until the page goes quiet or the
        // navigation budget runs out.
        let mut captured = Vec::new();
        let idle = Duration::from_millis(CAPTURE_IDLE_MS);
        loop {
            if started.elapsed() > Duration::from_millis(timeout_ms) {
                break;
            }
            match tokio::time::timeout(idle, events.next()).await {
                Ok(Some(event)) => {
                    let raw = serde_json::to_value(&*event).unwrap_or_default();
                    let request_id = raw
                        .get("requestId")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let response_url = raw
                        .pointer("/response/url")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    captured.push(NetworkEvent::new(request_id, response_url, raw));
                }
                Ok(None) | Err(_) => break,
            }
        }

        tracing::debug!("captured {} network events from {url}", captured.len());
        Ok(captured)
    }

    async fn response_body(&self, request_id: &str) -> Result<Option<String>> {
        let resp = self
            .page
            .execute(GetResponseBodyParams::new(RequestId::new(request_id)))
            .await
            .with_context(|| format!("Network.getResponseBody failed for request {request_id}"))?;

        let body = if resp.result.base64_encoded {
            let bytes = BASE64_STANDARD
                .decode(resp.result.body.as_bytes())
                .context("response body is not valid base64")?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            resp.result.body.clone()
        };

        if body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(body))
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_captures_network() {
        let renderer = ChromiumRenderer::new()
            .await
            .expect("failed to create renderer");
        let mut session = renderer
            .new_session()
            .await
            .expect("failed to create session");

        let events = session
            .navigate("https://example.com/", 15000)
            .await
            .expect("navigation failed");

        // The document fetch itself must show up in the capture.
        assert!(!events.is_empty());
        assert!(events.iter().any(|e| e.url.contains("example.com")));

        let doc = events
            .iter()
            .find(|e| e.url.contains("example.com"))
            .unwrap();
        let body = session
            .response_body(&doc.request_id)
            .await
            .expect("body fetch failed");
        assert!(body.is_some());

        session.close().await.expect("close failed");
        renderer.shutdown().await.expect("shutdown failed");
    }
}
