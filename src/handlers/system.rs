// ---------------------------------------------------------------------------
// handlers/system.rs: health and readiness
// ---------------------------------------------------------------------------

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: if state.storage_ready().await { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: "scrapestash".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        renderer: state.scraper.renderer_name().to_string(),
        storage_root: state.store.root().display().to_string(),
    })
}

/// GET /api/health/ready. 503 until the storage root is usable.
pub async fn readiness(State(state): State<AppState>) -> axum::response::Response {
    let ready = state.storage_ready().await;
    let body = ReadinessResponse {
        ready,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };

    if ready {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}
