use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// URL input / scrape
// ---------------------------------------------------------------------------

/// Body of `POST /input`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputForm {
    #[serde(default)]
    pub url: String,
}

/// Query of `GET /scrape`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeQuery {
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app: String,
    pub uptime_seconds: u64,
    pub renderer: String,
    pub storage_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub uptime_seconds: u64,
}
