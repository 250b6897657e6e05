use std::env;

use crate::error::AppError;

/// Database target selected from `DATABASE_URL` (or forced by tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbKind {
    /// Postgres server, `postgres://` or `postgresql://`
    Postgres(String),
    /// SQLite database file, `sqlite://path` or `sqlite:path`
    SqliteFile(String),
    /// Private in-memory SQLite database; lives as long as its single pooled connection
    SqliteMemory,
}

impl DbKind {
    /// Classify a connection URL by scheme
    pub fn from_url(url: &str) -> Result<Self, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::config("DATABASE_URL must not be empty"));
        }
        if url == "sqlite::memory:" || url.starts_with("sqlite::memory:?") {
            return Ok(DbKind::SqliteMemory);
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(DbKind::Postgres(url.to_string()));
        }
        if url.starts_with("sqlite:") {
            return Ok(DbKind::SqliteFile(url.to_string()));
        }
        Err(AppError::config(format!(
            "Unsupported DATABASE_URL scheme; expected postgres:// or sqlite: (got '{}')",
            url.split(':').next().unwrap_or_default()
        )))
    }

    /// Read and classify `DATABASE_URL`
    pub fn from_env() -> Result<Self, AppError> {
        let url = env::var("DATABASE_URL").map_err(|_| {
            AppError::config("Required environment variable 'DATABASE_URL' is not set")
        })?;
        Self::from_url(&url)
    }

    /// Connection string handed to sea-orm
    pub fn url(&self) -> &str {
        match self {
            DbKind::Postgres(url) | DbKind::SqliteFile(url) => url,
            DbKind::SqliteMemory => "sqlite::memory:",
        }
    }

    /// Short label for logs; never includes credentials
    pub fn label(&self) -> &'static str {
        match self {
            DbKind::Postgres(_) => "postgres",
            DbKind::SqliteFile(_) => "sqlite-file",
            DbKind::SqliteMemory => "sqlite-memory",
        }
    }
}
