pub mod config;
pub mod handlers;
pub mod manual;
pub mod models;
pub mod render;
pub mod sanitize;
pub mod scrape;
pub mod state;
pub mod storage;
pub mod templates;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use state::AppState;

/// Build the application router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        .route("/api/health/ready", get(handlers::readiness))
        // Scrape
        .route("/", get(handlers::index))
        .route("/input", get(handlers::input_form).post(handlers::input_submit))
        .route("/scrape", get(handlers::scrape))
        // Browse
        .route("/dash", get(handlers::dashboard))
        .route("/data/{directory}", get(handlers::list_collection))
        .route("/data/{directory}/{filename}", get(handlers::view_file))
        // Manual capture
        .route(
            "/manual_input/",
            get(handlers::manual_input_form_root).post(handlers::manual_input_submit_root),
        )
        .route(
            "/manual_input/{directory}",
            get(handlers::manual_input_form).post(handlers::manual_input_submit),
        )
        // Multipart bodies are capped by axum's own limit (2 MB) unless raised.
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
