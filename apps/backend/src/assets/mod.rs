//! Storage for images attached to notes.
//!
//! Stores return an opaque reference (a URL or site path) that is recorded
//! on the note as `image_ref`. Callers treat every `UploadError` as
//! non-fatal.

pub mod cloudinary;
pub mod local;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

pub use cloudinary::CloudinaryAssetStore;
pub use local::LocalAssetStore;

use crate::config::AssetBackendConfig;
use crate::AppError;

/// Uploads larger than this are rejected before reaching a store.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A file part pulled out of a note form
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    /// Lowercase alphanumeric extension of the client file name, if it has a usable one
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("asset write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("asset host rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("asset host response had no secure_url")]
    MissingUrl,
}

#[async_trait]
pub trait AssetStore: Send + Sync + fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Persist `file` and return the reference to record on the note
    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError>;
}

pub fn build_asset_store(config: &AssetBackendConfig) -> Result<Arc<dyn AssetStore>, AppError> {
    match config {
        AssetBackendConfig::Local { dir } => Ok(Arc::new(LocalAssetStore::new(dir.clone()))),
        AssetBackendConfig::Cloudinary(cfg) => {
            Ok(Arc::new(CloudinaryAssetStore::new(cfg.clone())?))
        }
    }
}
