use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::{AssetStore, UploadError, UploadedFile};
use crate::config::CloudinaryConfig;
use crate::AppError;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed uploads to a Cloudinary-compatible image host.
#[derive(Debug, Clone)]
pub struct CloudinaryAssetStore {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryAssetStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.config.cloud_name)
    }
}

/// Request signature: parameters sorted by name, joined as `k=v&k=v`, with
/// the API secret appended, then SHA-1 hex encoded.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let mut part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone().unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self.http.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        let url = parsed.secure_url.ok_or(UploadError::MissingUrl)?;
        debug!(folder = %self.config.folder, "uploaded asset to host");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_published_example() {
        let signature = sign_params(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "sample_image"),
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn signature_over_folder_and_timestamp() {
        let signature = sign_params(&[("timestamp", "1700000000"), ("folder", "notes")], "shh");
        assert_eq!(signature, "9dbd19ed2dbd280c68561923c47a3744c7375e60");
    }

    #[test]
    fn endpoint_uses_cloud_name() {
        let store = CloudinaryAssetStore::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            folder: "notes".into(),
        })
        .unwrap();
        assert_eq!(
            store.endpoint(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(store.name(), "cloudinary");
    }
}
