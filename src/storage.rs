use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// 1. StorageService Contract
/// StorageService
///
/// Defines the abstract contract for the upload storage layer. This trait allows
/// us to swap the concrete implementation, from the local-disk store (DiskStorage)
/// in production to the in-memory Mock (MockStorageService) during testing,
/// without affecting the calling handlers.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the uploads directory exists. Called once at startup; a no-op when
    /// the directory is already present.
    async fn ensure_uploads_dir(&self);

    /// Persists an accepted image under a generated unique filename and returns
    /// the path recorded on the report (e.g. `uploads/photo-....jpg`). The
    /// extension is taken from the client's original filename, sanitized.
    async fn store_image(&self, original_name: &str, data: &[u8]) -> Result<String, String>;

    /// Removes a previously stored upload. Refuses paths that escape the uploads
    /// directory.
    async fn remove_upload(&self, path: &str) -> Result<(), String>;
}

/// StorageState
///
/// The concrete type used to share the storage service access across the application state.
pub type StorageState = Arc<dyn StorageService>;

/// FileCleanup
///
/// Outcome of the best-effort photo removal that accompanies a report deletion.
/// The record is already gone in every case; this only says what happened to the
/// file on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum FileCleanup {
    /// The report had no photo attached.
    NoFile,
    /// The stored photo was removed.
    Removed,
    /// The record was deleted but the file removal failed; carries the reason.
    Failed(String),
}

/// sanitize_extension
///
/// Extracts the extension from a client-supplied filename, keeping only ASCII
/// alphanumerics. Falls back to "bin" when the name has no usable extension, so
/// a hostile filename can never smuggle path components into the stored name.
fn sanitize_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(|ext| {
            ext.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

/// unique_photo_name
///
/// Generates the stored filename: millisecond timestamp plus a random suffix,
/// preserving the (sanitized) original extension.
fn unique_photo_name(original_name: &str) -> String {
    format!(
        "photo-{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_extension(original_name)
    )
}

/// file_component
///
/// Reduces a stored path ("uploads/photo-....jpg") to its final component,
/// rejecting anything with directory navigation in it. This is the traversal
/// guard for removals.
fn file_component(path: &str) -> Result<String, String> {
    let name = path.strip_prefix("uploads/").unwrap_or(path);
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(format!("refusing path outside uploads dir: {path}"));
    }
    Ok(name.to_string())
}

// 2. The Real Implementation (Local Disk)
/// DiskStorage
///
/// The concrete implementation writing uploads to a directory on local disk.
/// The same directory is served read-only under the `/uploads` URL prefix by
/// the router's static file service.
#[derive(Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageService for DiskStorage {
    /// ensure_uploads_dir
    ///
    /// Creates the uploads directory (and parents) if missing. Idempotent, safe
    /// to call at every startup.
    async fn ensure_uploads_dir(&self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            tracing::error!(error = ?e, dir = %self.root.display(), "failed to create uploads dir");
        }
    }

    async fn store_image(&self, original_name: &str, data: &[u8]) -> Result<String, String> {
        let name = unique_photo_name(original_name);
        let dest = self.root.join(&name);

        tokio::fs::write(&dest, data)
            .await
            .map_err(|e| e.to_string())?;

        Ok(format!("uploads/{name}"))
    }

    async fn remove_upload(&self, path: &str) -> Result<(), String> {
        let name = file_component(path)?;
        tokio::fs::remove_file(self.root.join(name))
            .await
            .map_err(|e| e.to_string())
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockStorageService
///
/// A mock implementation of `StorageService` used exclusively for unit and
/// integration testing. Records every store and removal so tests can assert on
/// the handler's storage interactions without touching the filesystem.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    pub stored: Arc<Mutex<Vec<String>>>,
    pub removed: Arc<Mutex<Vec<String>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_uploads_dir(&self) {
        // No-op in mock environment.
    }

    async fn store_image(&self, original_name: &str, _data: &[u8]) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        let path = format!("uploads/{}", unique_photo_name(original_name));
        self.stored.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove_upload(&self, path: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        let name = file_component(path)?;
        self.removed.lock().unwrap().push(name);
        Ok(())
    }
}
