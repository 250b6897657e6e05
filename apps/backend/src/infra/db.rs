use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::DbKind;
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

/// Retry a connection attempt with fixed interval delays.
/// Returns the result of the last attempt after all retries are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    interval_ms,
                    error = %e,
                    "connection_retry=failed"
                );
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn connect_options(kind: &DbKind) -> ConnectOptions {
    let mut opts = ConnectOptions::new(kind.url().to_owned());
    opts.sqlx_logging(false);
    match kind {
        // Each pooled connection would otherwise see its own empty database
        DbKind::SqliteMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::SqliteFile(_) => {
            opts.max_connections(1);
        }
        DbKind::Postgres(_) => {
            opts.max_connections(10)
                .connect_timeout(Duration::from_secs(5));
        }
    }
    opts
}

/// Open a pool for `kind`. Does NOT run migrations.
pub async fn connect_db(kind: &DbKind) -> Result<DatabaseConnection, AppError> {
    let attempts = match kind {
        DbKind::Postgres(_) => CONNECT_ATTEMPTS,
        _ => 1,
    };
    retry_connection(
        || async {
            Database::connect(connect_options(kind))
                .await
                .map_err(AppError::from)
        },
        attempts,
        CONNECT_RETRY_INTERVAL_MS,
    )
    .await
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(kind: &DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(kind).await?;
    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::db(format!("Migration failed: {e}")))?;
    info!(db = kind.label(), "database ready");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use sea_orm::{ConnectionTrait, Statement};

    use super::*;

    #[tokio::test]
    async fn memory_bootstrap_creates_schema() {
        let conn = bootstrap_db(&DbKind::SqliteMemory).await.unwrap();
        let backend = conn.get_database_backend();
        let rows = conn
            .query_all(Statement::from_string(
                backend,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'notes')",
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), AppError> = retry_connection(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::db_unavailable("down")) }
            },
            3,
            1,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_connection(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(AppError::db_unavailable("warming up"))
                    } else {
                        Ok(n)
                    }
                }
            },
            3,
            1,
        )
        .await;

        assert_eq!(result.unwrap(), 1);
    }
}
