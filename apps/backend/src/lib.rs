#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod assets;
pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod flash;
pub mod infra;
pub mod logging;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;
pub mod views;

#[cfg(test)]
mod test_bootstrap;

// Re-exports for public API
pub use auth::{SessionBackend, SessionClaims, SessionIdentity, TokenRejection};
pub use config::{AppConfig, DbKind, SessionBackendKind};
pub use error::AppError;
pub use extractors::{CurrentUser, MaybeUser, NoteForm, NoteId};
pub use infra::db::{bootstrap_db, connect_db};
pub use infra::state::build_state;
pub use middleware::{CheckUser, RequestTrace, RequireAuth, StructuredLogger, TraceSpan};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
