// src/scrape.rs
//! Scrape-with-fallback.
//!
//! Tier 1 is a plain HTTP GET whose body is reduced to visible text. When it
//! errors or answers with a non-2xx status, tier 2 renders the page in a
//! headless browser and keeps the *full markup*. The two tiers deliberately
//! produce different shapes of output.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::config::AppConfig;
use crate::render::{PageRenderer, RenderError};
use crate::storage::{CaptureKind, CollectionStore};

/// Elements whose text never counts as visible page text.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DirectFetchError {
    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Which tier produced a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Direct fetch, markup stripped.
    Direct,
    /// Headless render, full markup.
    Rendered,
}

#[derive(Debug, Clone)]
pub struct PageCapture {
    pub url: String,
    pub content: String,
    pub source: CaptureSource,
}

/// Terminal outcome of a failed scrape. The `Display` text is what the end
/// user sees.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeFailure {
    #[error("There was an issue scraping the data for {url}. You will need to debug this.")]
    Fetch {
        url: String,
        direct: String,
        rendered: String,
    },

    #[error("There was an issue saving the scraped data for {url}. You will need to debug this.")]
    Save { url: String, reason: String },
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

pub struct Scraper {
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
    render_timeout: Duration,
}

impl Scraper {
    pub fn new(config: &AppConfig, renderer: Arc<dyn PageRenderer>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, renderer, render_timeout: config.render_timeout })
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    /// Tier 1: GET the page and return its visible text.
    pub async fn fetch_direct(&self, url: &str) -> Result<String, DirectFetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DirectFetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        Ok(extract_visible_text(&body))
    }

    /// Tier 2: render in the headless browser, bounded by the render timeout.
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        match tokio::time::timeout(self.render_timeout, self.renderer.render(url)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.render_timeout.as_secs())),
        }
    }

    /// Run tier 1, falling back to tier 2 on any tier-1 failure.
    pub async fn scrape(&self, url: &str) -> Result<PageCapture, ScrapeFailure> {
        let direct_err = match self.fetch_direct(url).await {
            Ok(text) => {
                return Ok(PageCapture {
                    url: url.to_string(),
                    content: text,
                    source: CaptureSource::Direct,
                });
            }
            Err(e) => e,
        };

        tracing::warn!(
            url,
            renderer = self.renderer.name(),
            "direct fetch failed: {}. Falling back to headless render.",
            direct_err
        );

        match self.render(url).await {
            Ok(markup) => Ok(PageCapture {
                url: url.to_string(),
                content: markup,
                source: CaptureSource::Rendered,
            }),
            Err(render_err) => {
                tracing::error!(url, "headless render failed: {}", render_err);
                Err(ScrapeFailure::Fetch {
                    url: url.to_string(),
                    direct: direct_err.to_string(),
                    rendered: render_err.to_string(),
                })
            }
        }
    }

    /// Scrape `url` and write the capture into the collection named after it.
    pub async fn scrape_and_store(
        &self,
        store: &CollectionStore,
        url: &str,
        at: NaiveDateTime,
    ) -> Result<PathBuf, ScrapeFailure> {
        let capture = self.scrape(url).await?;
        tracing::info!(
            url,
            source = ?capture.source,
            bytes = capture.content.len(),
            "page captured"
        );

        store
            .write_capture(url, CaptureKind::Scrape, at, &capture.content)
            .await
            .map_err(|e| {
                tracing::error!(url, "failed to save capture: {}", e);
                ScrapeFailure::Save { url: url.to_string(), reason: e.to_string() }
            })
    }
}

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

/// Concatenate the document's text nodes in order, skipping script-like
/// elements. Whitespace is left exactly as it appears in the markup.
pub fn extract_visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    collect_text(doc.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    if INVISIBLE_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}
