use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{AssetStore, UploadError, UploadedFile};

/// URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Writes uploads to a directory served at `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    dir: PathBuf,
}

impl LocalAssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let id = ulid::Ulid::new().to_string().to_ascii_lowercase();
        let name = match file.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id,
        };
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        debug!(file = %name, bytes = file.bytes.len(), "stored upload locally");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }
}
