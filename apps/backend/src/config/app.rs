use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::db::DbKind;
use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_CLOUDINARY_FOLDER: &str = "notes";

/// Which session backend issues and verifies `token` cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionBackendKind {
    /// Stateless HS256 JWT; logout only clears the cookie
    #[default]
    Jwt,
    /// Server-side session table keyed by a signed random id
    Memory,
}

impl FromStr for SessionBackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jwt" => Ok(Self::Jwt),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::config(format!(
                "SESSION_BACKEND must be 'jwt' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Where uploaded note images end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBackendConfig {
    Local { dir: PathBuf },
    Cloudinary(CloudinaryConfig),
}

/// Process configuration read once at startup
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbKind,
    pub jwt_secret: String,
    pub session_backend: SessionBackendKind,
    pub assets: AssetBackendConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db.label())
            .field("jwt_secret", &"<redacted>")
            .field("session_backend", &self.session_backend)
            .field("assets", &self.assets)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = optional_var("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match optional_var("BACKEND_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let db = DbKind::from_env()?;
        let jwt_secret = must_var("BACKEND_JWT_SECRET")?;

        let session_backend = match optional_var("SESSION_BACKEND") {
            Some(raw) => raw.parse()?,
            None => SessionBackendKind::default(),
        };

        let assets = asset_backend_from_env()?;

        Ok(Self {
            host,
            port,
            db,
            jwt_secret,
            session_backend,
            assets,
        })
    }
}

fn asset_backend_from_env() -> Result<AssetBackendConfig, AppError> {
    let backend = optional_var("ASSET_BACKEND").unwrap_or_else(|| "local".to_string());
    match backend.to_ascii_lowercase().as_str() {
        "local" => Ok(AssetBackendConfig::Local {
            dir: PathBuf::from(
                optional_var("UPLOADS_DIR").unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_string()),
            ),
        }),
        "cloudinary" => Ok(AssetBackendConfig::Cloudinary(CloudinaryConfig {
            cloud_name: must_var("CLOUDINARY_CLOUD_NAME")?,
            api_key: must_var("CLOUDINARY_API_KEY")?,
            api_secret: must_var("CLOUDINARY_API_SECRET")?,
            folder: optional_var("CLOUDINARY_FOLDER")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_FOLDER.to_string()),
        })),
        other => Err(AppError::config(format!(
            "ASSET_BACKEND must be 'local' or 'cloudinary', got '{other}'"
        ))),
    }
}

/// Unset and blank variables are treated the same
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn must_var(name: &str) -> Result<String, AppError> {
    optional_var(name)
        .ok_or_else(|| AppError::config(format!("Required environment variable '{name}' is not set")))
}
