// src/manual.rs
//! Manual capture: uploaded files and/or pasted text saved into a
//! user-named collection.

use chrono::NaiveDateTime;

use crate::storage::{CaptureKind, CollectionStore, StorageError};

/// One file part of a manual-capture submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Browsers send an empty, nameless part when no file was chosen.
    pub fn is_placeholder(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualCapture {
    pub directory: String,
    pub files: Vec<UploadedFile>,
    pub manual_text: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ManualCaptureReport {
    pub collection: String,
    pub written: Vec<String>,
}

/// Store every upload under its secured name, then the pasted text (if any)
/// as `manual_text_<timestamp>.txt`. The collection directory is created even
/// when the submission carries nothing to write.
pub async fn save_manual_capture(
    store: &CollectionStore,
    capture: &ManualCapture,
    at: NaiveDateTime,
) -> Result<ManualCaptureReport, StorageError> {
    let (collection, _) = store.ensure_collection(&capture.directory).await?;
    tracing::info!(collection = %collection, files = capture.files.len(), "manual capture");

    let mut written = Vec::new();

    for file in capture.files.iter().filter(|f| !f.is_placeholder()) {
        let path = store.save_upload(&collection, &file.file_name, &file.bytes).await?;
        written.push(file_name_of(&path));
    }

    if !capture.manual_text.is_empty() {
        let path = store
            .write_capture(&collection, CaptureKind::ManualText, at, &capture.manual_text)
            .await?;
        written.push(file_name_of(&path));
    }

    Ok(ManualCaptureReport { collection, written })
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
