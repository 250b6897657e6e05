use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::assets::AssetStore;
use crate::auth::SessionBackend;
use crate::error::AppError;

/// Shared resources built once at startup and cloned into every worker
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection (optional for test scenarios)
    db: Option<DatabaseConnection>,
    /// Signing secret and session lifetime
    pub security: SecurityConfig,
    pub sessions: Arc<dyn SessionBackend>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        security: SecurityConfig,
        sessions: Arc<dyn SessionBackend>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            db: Some(db),
            security,
            sessions,
            assets,
        }
    }

    /// State without a database; only routes that never touch storage work
    pub fn without_db(
        security: SecurityConfig,
        sessions: Arc<dyn SessionBackend>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            db: None,
            security,
            sessions,
            assets,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    /// The connection, or a 503-shaped error when running without one
    pub fn require_db(&self) -> Result<&DatabaseConnection, AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::db_unavailable("Database not configured"))
    }
}
