// src/state.rs
// Shared application state.

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::render::PageRenderer;
use crate::scrape::Scraper;
use crate::storage::CollectionStore;

/// Central application state. Cheap to clone; everything inside is an Arc
/// or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: CollectionStore,
    pub scraper: Arc<Scraper>,
    pub start_time: Instant,
}

impl AppState {
    /// Build state with an explicit renderer (tests pass a stub here).
    pub fn new(config: AppConfig, renderer: Arc<dyn PageRenderer>) -> Result<Self, reqwest::Error> {
        let store = CollectionStore::new(config.storage_root.clone(), config.reserved_dirs.clone());
        let scraper = Scraper::new(&config, renderer)?;

        tracing::info!(
            "AppState initialised: storage_root={}, renderer={}",
            store.root().display(),
            scraper.renderer_name()
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            scraper: Arc::new(scraper),
            start_time: Instant::now(),
        })
    }

    /// Build state with the renderer selected in `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, reqwest::Error> {
        let renderer = crate::render::from_config(&config);
        Self::new(config, renderer)
    }

    /// The storage root exists and is a directory.
    pub async fn storage_ready(&self) -> bool {
        tokio::fs::metadata(self.store.root())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
