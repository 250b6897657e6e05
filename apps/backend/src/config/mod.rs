pub mod app;
pub mod db;

pub use app::{AppConfig, AssetBackendConfig, CloudinaryConfig, SessionBackendKind};
pub use db::DbKind;
