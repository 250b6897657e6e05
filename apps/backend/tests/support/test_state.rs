use notes_backend::assets::LocalAssetStore;
use notes_backend::config::{DbKind, SessionBackendKind};
use notes_backend::infra::state::build_state;
use notes_backend::state::app_state::AppState;
use notes_backend::state::security_config::SecurityConfig;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_purposes_only";

/// Migrated in-memory database plus a scratch upload directory. Keep the
/// whole value alive for the duration of the test; dropping it removes
/// the directory.
pub struct TestState {
    pub state: AppState,
    pub uploads: TempDir,
}

pub async fn build_test_state(sessions: SessionBackendKind) -> TestState {
    let uploads = tempfile::tempdir().expect("create upload dir");
    let state = build_state()
        .with_db(DbKind::SqliteMemory)
        .with_security(SecurityConfig::new(TEST_SECRET))
        .with_sessions(sessions)
        .with_assets(Arc::new(LocalAssetStore::new(uploads.path())))
        .build()
        .await
        .expect("build in-memory test state");
    TestState { state, uploads }
}
