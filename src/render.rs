// src/render.rs
//! Headless-browser renderers used as the scrape fallback.
//!
//! A renderer returns the full rendered document markup for a URL. The
//! concrete backend is chosen by `SCRAPER_RENDERER` at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::{Stream, StreamExt};

use crate::config::{AppConfig, RendererKind};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("page load failed: {0}")]
    Page(String),

    #[error("render timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("renderer API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("headless rendering is disabled")]
    Disabled,
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(err.to_string())
    }
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Short label for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Load `url` in a browser and return the rendered document markup.
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Build the renderer selected in `config`.
pub fn from_config(config: &AppConfig) -> Arc<dyn PageRenderer> {
    match config.renderer {
        RendererKind::Chromium => Arc::new(ChromiumRenderer::new(config.chrome_executable.clone())),
        RendererKind::Browserless => Arc::new(BrowserlessRenderer::new(
            &config.browserless_url,
            config.browserless_token.as_deref(),
            config.render_timeout,
        )),
        RendererKind::Disabled => Arc::new(DisabledRenderer),
    }
}

// ---------------------------------------------------------------------------
// Local Chromium (chromiumoxide)
// ---------------------------------------------------------------------------

/// Launches a fresh headless Chromium for every render and closes it after.
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
}

impl ChromiumRenderer {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| RenderError::Launch(format!("browser config: {e}")))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let (mut browser, handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The CDP handler has to be polled for the browser to make progress.
        let pump = tokio::spawn(drain_events(handler));

        let result = async {
            let page = browser
                .new_page(url)
                .await
                .map_err(|e| RenderError::Page(e.to_string()))?;
            page.content()
                .await
                .map_err(|e| RenderError::Page(e.to_string()))
        }
        .await;

        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "chromium close failed");
        }
        let _ = browser.wait().await;
        pump.abort();

        result
    }
}

/// Poll browser events until the connection closes. Undecodable events are
/// common and must not stop the pump. Returns the number of events seen.
async fn drain_events<S, E>(events: S) -> usize
where
    S: Stream<Item = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut events = std::pin::pin!(events);
    let mut seen = 0;
    while let Some(event) = events.next().await {
        seen += 1;
        if let Err(e) = event {
            tracing::debug!(error = %e, "chromium handler event error");
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Browserless /content API
// ---------------------------------------------------------------------------

pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("browserless client builder failed ({e}); using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    fn endpoint(&self) -> String {
        match &self.token {
            Some(token) => format!("{}/content?token={token}", self.base_url),
            None => format!("{}/content", self.base_url),
        }
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    fn name(&self) -> &'static str {
        "browserless"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RenderError::Api { status: status.as_u16(), message });
        }

        Ok(resp.text().await?)
    }
}

// ---------------------------------------------------------------------------
// Disabled
// ---------------------------------------------------------------------------

pub struct DisabledRenderer;

#[async_trait]
impl PageRenderer for DisabledRenderer {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        Err(RenderError::Disabled)
    }
}
