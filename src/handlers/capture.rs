// ---------------------------------------------------------------------------
// handlers/capture.rs: URL input, scrape and manual capture
// ---------------------------------------------------------------------------

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Local;

use crate::manual::{self, ManualCapture, UploadedFile};
use crate::models::{InputForm, ScrapeQuery};
use crate::sanitize::sanitize_optional;
use crate::state::AppState;
use crate::templates;

use super::ApiError;

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/dash")
}

/// GET /input
pub async fn input_form() -> Html<String> {
    Html(templates::render_input())
}

/// POST /input. Hands the URL to the scraper, or sends the user to manual input when
/// nothing was entered.
pub async fn input_submit(Form(form): Form<InputForm>) -> Redirect {
    let url = form.url.trim();
    if url.is_empty() {
        return Redirect::to("/manual_input/");
    }
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    Redirect::to(&format!("/scrape?url={encoded}"))
}

/// GET /scrape?url=...
pub async fn scrape(State(state): State<AppState>, Query(query): Query<ScrapeQuery>) -> Response {
    let url = query.url.unwrap_or_default();
    let url = url.trim();
    if url.is_empty() {
        return ApiError::BadRequest("No URL given to scrape".to_string()).into_response();
    }

    let at = Local::now().naive_local();
    match state.scraper.scrape_and_store(&state.store, url, at).await {
        Ok(path) => {
            tracing::info!(url, path = %path.display(), "scrape stored");
            Redirect::to("/dash").into_response()
        }
        Err(failure) => failure.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Manual input
// ---------------------------------------------------------------------------

/// GET /manual_input/
pub async fn manual_input_form_root() -> Html<String> {
    Html(templates::render_manual_input(""))
}

/// GET /manual_input/{directory}
pub async fn manual_input_form(Path(directory): Path<String>) -> Html<String> {
    Html(templates::render_manual_input(&directory))
}

/// POST /manual_input/
pub async fn manual_input_submit_root(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    submit_manual(state, None, multipart).await
}

/// POST /manual_input/{directory}
pub async fn manual_input_submit(
    State(state): State<AppState>,
    Path(directory): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    submit_manual(state, Some(directory), multipart).await
}

async fn submit_manual(
    state: AppState,
    path_directory: Option<String>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let capture = read_manual_form(multipart, path_directory).await?;
    let report = manual::save_manual_capture(&state.store, &capture, Local::now().naive_local()).await?;
    tracing::info!(
        collection = %report.collection,
        written = report.written.len(),
        "manual capture stored"
    );
    Ok(Redirect::to(&format!("/data/{}", report.collection)))
}

/// Collect the `directory`, `files` and `manual_text` parts. A `directory`
/// field, even an empty one, wins over the name in the path; the winner is
/// sanitized here.
async fn read_manual_form(
    mut multipart: Multipart,
    path_directory: Option<String>,
) -> Result<ManualCapture, ApiError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        ApiError::BadRequest(format!("Invalid form data: {e}"))
    };

    let mut directory = None;
    let mut capture = ManualCapture::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "directory" => directory = Some(field.text().await.map_err(bad_form)?),
            "manual_text" => capture.manual_text = field.text().await.map_err(bad_form)?,
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                capture.files.push(UploadedFile { file_name, bytes: bytes.to_vec() });
            }
            other => tracing::debug!(field = other, "ignoring unexpected form field"),
        }
    }

    capture.directory = sanitize_optional(directory.as_deref().or(path_directory.as_deref()));
    Ok(capture)
}
