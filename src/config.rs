// src/config.rs
//! Environment-driven configuration.
//!
//! Everything is read once at startup (after `dotenvy` has loaded `.env`)
//! and then shared read-only through `AppState`.

use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RESERVED_DIRS: &[&str] = &["templates", "static", ".git"];
const DEFAULT_BROWSERLESS_URL: &str = "http://localhost:3000";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("SCRAPER_RENDERER must be one of chromium, browserless, disabled, got '{0}'")]
    UnknownRenderer(String),
}

/// Which headless renderer backs the tier-2 fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererKind {
    Chromium,
    Browserless,
    Disabled,
}

impl std::str::FromStr for RendererKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "browserless" => Ok(Self::Browserless),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(ConfigError::UnknownRenderer(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory that holds one subdirectory per collection.
    pub storage_root: PathBuf,
    /// Top-level directory names never shown as collections.
    pub reserved_dirs: Vec<String>,
    pub renderer: RendererKind,
    pub chrome_executable: Option<PathBuf>,
    pub browserless_url: String,
    pub browserless_token: Option<String>,
    pub fetch_timeout: Duration,
    pub render_timeout: Duration,
    pub max_upload_bytes: usize,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage_root: PathBuf::from("."),
            reserved_dirs: DEFAULT_RESERVED_DIRS.iter().map(|s| s.to_string()).collect(),
            renderer: RendererKind::Chromium,
            chrome_executable: None,
            browserless_url: DEFAULT_BROWSERLESS_URL.to_string(),
            browserless_token: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            user_agent: concat!("scrapestash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    /// Unset variables fall back to the defaults above.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let reserved_dirs = match var("RESERVED_DIRS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.reserved_dirs,
        };

        let renderer = match var("SCRAPER_RENDERER") {
            Some(raw) => raw.parse()?,
            None => defaults.renderer,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_number("PORT", var("PORT"), defaults.port)?,
            storage_root: var("STORAGE_ROOT").map(PathBuf::from).unwrap_or(defaults.storage_root),
            reserved_dirs,
            renderer,
            chrome_executable: var("CHROME_EXECUTABLE").map(PathBuf::from),
            browserless_url: var("BROWSERLESS_URL").unwrap_or(defaults.browserless_url),
            browserless_token: var("BROWSERLESS_TOKEN"),
            fetch_timeout: Duration::from_secs(parse_number(
                "FETCH_TIMEOUT_SECS",
                var("FETCH_TIMEOUT_SECS"),
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            render_timeout: Duration::from_secs(parse_number(
                "RENDER_TIMEOUT_SECS",
                var("RENDER_TIMEOUT_SECS"),
                DEFAULT_RENDER_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_number(
                "MAX_UPLOAD_BYTES",
                var("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
            user_agent: var("SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.storage_root, PathBuf::from("."));
        assert_eq!(cfg.reserved_dirs, vec!["templates", "static", ".git"]);
        assert_eq!(cfg.renderer, RendererKind::Chromium);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PORT", "8088"),
            ("STORAGE_ROOT", "/srv/captures"),
            ("RESERVED_DIRS", "static, node_modules ,"),
            ("SCRAPER_RENDERER", "Browserless"),
            ("BROWSERLESS_TOKEN", "t0k"),
            ("RENDER_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.storage_root, PathBuf::from("/srv/captures"));
        assert_eq!(cfg.reserved_dirs, vec!["static", "node_modules"]);
        assert_eq!(cfg.renderer, RendererKind::Browserless);
        assert_eq!(cfg.browserless_token.as_deref(), Some("t0k"));
        assert_eq!(cfg.render_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: "PORT", .. }));
    }

    #[test]
    fn unknown_renderer_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("SCRAPER_RENDERER", "playwright")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRenderer(_)));
    }
}
