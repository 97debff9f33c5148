// ---------------------------------------------------------------------------
// handlers/browse.rs: dashboard, collection listing and file view
// ---------------------------------------------------------------------------

use axum::extract::{Path, State};
use axum::response::Html;

use crate::state::AppState;
use crate::storage::StorageError;
use crate::templates;

use super::ApiError;

/// GET /dash
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let collections = state.store.list_collections().await?;
    Ok(Html(templates::render_dashboard(&collections)))
}

/// GET /data/{directory}
pub async fn list_collection(
    State(state): State<AppState>,
    Path(directory): Path<String>,
) -> Result<Html<String>, ApiError> {
    let (collection, _) = state.store.collection_path(&directory).map_err(browse_error)?;
    let files = state.store.list_files(&collection).await.map_err(browse_error)?;
    Ok(Html(templates::render_data(&collection, &files)))
}

/// GET /data/{directory}/{filename}
pub async fn view_file(
    State(state): State<AppState>,
    Path((directory, filename)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let file = state
        .store
        .read_file(&directory, &filename)
        .await
        .map_err(browse_error)?;
    Ok(Html(templates::render_view(&file)))
}

/// A name that sanitizes to nothing can never exist, so it reads as 404.
fn browse_error(err: StorageError) -> ApiError {
    match err {
        StorageError::EmptyName => ApiError::NotFound("empty collection name".to_string()),
        other => other.into(),
    }
}
