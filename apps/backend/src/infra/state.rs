use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::{AssetStore, LocalAssetStore};
use crate::auth::build_session_backend;
use crate::config::{DbKind, SessionBackendKind};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    db_kind: Option<DbKind>,
    session_backend: SessionBackendKind,
    assets: Option<Arc<dyn AssetStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db_kind: None,
            session_backend: SessionBackendKind::default(),
            assets: None,
        }
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_sessions(mut self, kind: SessionBackendKind) -> Self {
        self.session_backend = kind;
        self
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let sessions = build_session_backend(self.session_backend, &self.security_config);
        let assets = self
            .assets
            .unwrap_or_else(|| Arc::new(LocalAssetStore::new(PathBuf::from("uploads"))));

        if let Some(kind) = self.db_kind {
            // single entrypoint: build + migrate
            let conn = bootstrap_db(&kind).await?;
            Ok(AppState::new(conn, self.security_config, sessions, assets))
        } else {
            Ok(AppState::without_db(self.security_config, sessions, assets))
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_succeeds_without_db_option() {
        let state = build_state().build().await.unwrap();
        assert!(state.db().is_none());
        assert!(state.require_db().is_err());
        assert_eq!(state.sessions.name(), "jwt");
        assert_eq!(state.assets.name(), "local");
    }

    #[tokio::test]
    async fn builds_memory_sessions_over_sqlite() {
        let state = build_state()
            .with_db(DbKind::SqliteMemory)
            .with_sessions(SessionBackendKind::Memory)
            .build()
            .await
            .unwrap();
        assert!(state.db().is_some());
        assert_eq!(state.sessions.name(), "memory");
    }
}
