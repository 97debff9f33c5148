// ---------------------------------------------------------------------------
// handlers/: route handlers grouped by concern
// mod.rs re-exports the public items so `crate::handlers::*` stays flat.
// ---------------------------------------------------------------------------

pub(crate) mod browse;
pub(crate) mod capture;
pub(crate) mod system;

// ── Re-exports ───────────────────────────────────────────────────────────────

// Health
pub use system::{health, readiness};

// Dashboard / listings / file view
pub use browse::{dashboard, list_collection, view_file};

// Scrape + manual capture
pub use capture::{
    index, input_form, input_submit, manual_input_form, manual_input_form_root,
    manual_input_submit, manual_input_submit_root, scrape,
};

// ── Shared types ─────────────────────────────────────────────────────────────

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::scrape::ScrapeFailure;
use crate::storage::StorageError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for the browser-facing handlers.
/// Logs full details server-side, returns a short plain-text message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable code, used in logs only.
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to users. NotFound and Internal never echo
    /// filesystem paths.
    pub(crate) fn sanitized_message(&self) -> String {
        match self {
            ApiError::BadRequest(m) => m.clone(),
            ApiError::NotFound(_) => "Resource not found".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            e @ (StorageError::EmptyName | StorageError::InvalidFileName(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            e @ StorageError::Io { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            code = self.error_code(),
            "request failed ({}): {}",
            status.as_u16(),
            self
        );

        plain_text(status, self.sanitized_message())
    }
}

impl ScrapeFailure {
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            ScrapeFailure::Fetch { .. } => StatusCode::BAD_GATEWAY,
            ScrapeFailure::Save { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScrapeFailure {
    fn into_response(self) -> Response {
        match &self {
            ScrapeFailure::Fetch { url, direct, rendered } => tracing::error!(
                url = %url,
                direct = %direct,
                rendered = %rendered,
                "scrape failed on both tiers"
            ),
            ScrapeFailure::Save { url, reason } => {
                tracing::error!(url = %url, reason = %reason, "scrape capture not saved")
            }
        }
        plain_text(self.status_code(), self.to_string())
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
