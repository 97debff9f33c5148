// src/storage.rs
//! Collection store: one directory per collection under a configured root.
//!
//! Directories are created lazily on first write and never removed. Files
//! are written once and then only read; a second write to the same name
//! (two captures in the same second) replaces the first.

use chrono::{DateTime, Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::sanitize::{sanitize_directory_name, secure_filename};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("collection name is empty after sanitization")]
    EmptyName,

    #[error("file name '{0}' has no usable characters")]
    InvalidFileName(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.display().to_string())
        } else {
            StorageError::Io { path: path.to_path_buf(), source }
        }
    }
}

/// What produced a timestamped capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Scrape,
    ManualText,
}

impl CaptureKind {
    pub fn prefix(self) -> &'static str {
        match self {
            CaptureKind::Scrape => "data",
            CaptureKind::ManualText => "manual_text",
        }
    }

    /// `<prefix>_<YYYYMMDD_HHMMSS>.txt`
    pub fn file_name(self, at: NaiveDateTime) -> String {
        format!("{}_{}.txt", self.prefix(), at.format("%Y%m%d_%H%M%S"))
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CollectionEntry {
    pub name: String,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    pub modified: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub collection: String,
    pub name: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CollectionStore {
    root: PathBuf,
    reserved: Vec<String>,
}

impl CollectionStore {
    pub fn new(root: impl Into<PathBuf>, reserved: Vec<String>) -> Self {
        Self { root: root.into(), reserved }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitize `name` and resolve it under the root without touching disk.
    pub fn collection_path(&self, name: &str) -> Result<(String, PathBuf), StorageError> {
        let sanitized = sanitize_directory_name(name);
        if sanitized.is_empty() {
            return Err(StorageError::EmptyName);
        }
        let path = self.root.join(&sanitized);
        Ok((sanitized, path))
    }

    /// Sanitize `name` and create its directory if it does not exist yet.
    pub async fn ensure_collection(&self, name: &str) -> Result<(String, PathBuf), StorageError> {
        let (sanitized, path) = self.collection_path(name)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| StorageError::Io { path: path.clone(), source: e })?;
        Ok((sanitized, path))
    }

    /// Write a timestamped capture into `collection`, creating it if needed.
    pub async fn write_capture(
        &self,
        collection: &str,
        kind: CaptureKind,
        at: NaiveDateTime,
        content: &str,
    ) -> Result<PathBuf, StorageError> {
        let (_, dir) = self.ensure_collection(collection).await?;
        let path = dir.join(kind.file_name(at));
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| StorageError::Io { path: path.clone(), source: e })?;
        tracing::info!(path = %path.display(), bytes = content.len(), "capture written");
        Ok(path)
    }

    /// Store an uploaded file under its secured name inside `collection`.
    pub async fn save_upload(
        &self,
        collection: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let file_name = secure_filename(original_name);
        if file_name.is_empty() {
            return Err(StorageError::InvalidFileName(original_name.to_string()));
        }
        let (_, dir) = self.ensure_collection(collection).await?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io { path: path.clone(), source: e })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "upload stored");
        Ok(path)
    }

    /// Top-level directories of the root, minus reserved names, by name.
    pub async fn list_collections(&self) -> Result<Vec<CollectionEntry>, StorageError> {
        let mut rd = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))?;

        let mut out = Vec::new();
        while let Some(entry) = rd
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.root, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.reserved.iter().any(|r| r == &name) {
                continue;
            }
            let Ok(meta) = entry.metadata().await else { continue };
            if !meta.is_dir() {
                continue;
            }
            out.push(CollectionEntry {
                name,
                modified: meta.modified().ok().map(format_mtime),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Entries of one collection, newest first (descending by name).
    pub async fn list_files(&self, collection: &str) -> Result<Vec<FileEntry>, StorageError> {
        let (_, dir) = self.collection_path(collection)?;
        let mut rd = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;

        let mut out = Vec::new();
        while let Some(entry) = rd.next_entry().await.map_err(|e| StorageError::io(&dir, e))? {
            let meta = entry.metadata().await.ok();
            out.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                size_bytes: meta.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: meta.and_then(|m| m.modified().ok()).map(format_mtime),
            });
        }
        out.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(out)
    }

    /// Read one file of a collection as text (invalid UTF-8 is replaced).
    pub async fn read_file(&self, collection: &str, file_name: &str) -> Result<StoredFile, StorageError> {
        let (sanitized, dir) = self.collection_path(collection)?;
        if !is_plain_file_name(file_name) {
            return Err(StorageError::NotFound(file_name.to_string()));
        }
        let path = dir.join(file_name);
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        Ok(StoredFile {
            collection: sanitized,
            name: file_name.to_string(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// A single path component that cannot climb out of its directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

fn format_mtime(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn store(root: &Path) -> CollectionStore {
        CollectionStore::new(root, vec!["templates".into(), "static".into(), ".git".into()])
    }

    #[test]
    fn capture_file_names() {
        assert_eq!(CaptureKind::Scrape.file_name(at(7, 5, 3)), "data_20240309_070503.txt");
        assert_eq!(
            CaptureKind::ManualText.file_name(at(23, 59, 59)),
            "manual_text_20240309_235959.txt"
        );
    }

    #[tokio::test]
    async fn write_creates_sanitized_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let path = store
            .write_capture("http://a.com/page?q=1", CaptureKind::Scrape, at(10, 0, 0), "hello")
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("http_a_com_page_q_1").join("data_20240309_100000.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn same_second_capture_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let first = store
            .write_capture("site", CaptureKind::Scrape, at(12, 0, 0), "first")
            .await
            .unwrap();
        let second = store
            .write_capture("site", CaptureKind::Scrape, at(12, 0, 0), "second")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
        assert_eq!(store.list_files("site").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn files_are_listed_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        for (i, t) in [at(9, 0, 0), at(11, 0, 0), at(10, 0, 0)].into_iter().enumerate() {
            store
                .write_capture("site", CaptureKind::Scrape, t, &format!("capture {i}"))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list_files("site")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "data_20240309_110000.txt",
                "data_20240309_100000.txt",
                "data_20240309_090000.txt",
            ]
        );
    }

    #[tokio::test]
    async fn collections_skip_reserved_and_plain_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        std::fs::create_dir(tmp.path().join("templates")).unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        std::fs::create_dir(tmp.path().join("zeta")).unwrap();
        std::fs::create_dir(tmp.path().join("alpha")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let names: Vec<_> = store
            .list_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn missing_collection_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let err = store.list_files("nothing-here").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = store.read_file("nothing-here", "data.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let err = store
            .write_capture("???", CaptureKind::ManualText, at(1, 2, 3), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptyName));
    }

    #[tokio::test]
    async fn read_refuses_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        store.ensure_collection("site").await.unwrap();
        std::fs::write(tmp.path().join("secret.txt"), "nope").unwrap();

        for bad in ["../secret.txt", "..", "", "a\\b"] {
            let err = store.read_file("site", bad).await.unwrap_err();
            assert!(matches!(err, StorageError::NotFound(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn read_of_subdirectory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        std::fs::create_dir_all(tmp.path().join("site").join("sub")).unwrap();

        let err = store.read_file("site", "sub").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn read_replaces_invalid_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        store.save_upload("bin", "blob.dat", &[b'o', b'k', 0xff]).await.unwrap();

        let file = store.read_file("bin", "blob.dat").await.unwrap();
        assert_eq!(file.collection, "bin");
        assert_eq!(file.content, "ok\u{fffd}");
    }

    #[tokio::test]
    async fn upload_with_unusable_name_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let err = store.save_upload("site", "../..", b"data").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileName(_)));
    }
}
