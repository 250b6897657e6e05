//! Argon2id password hashing, stored as PHC strings in `users.password_hash`.
//!
//! Both calls are CPU-heavy; async callers go through [`hash_password_blocking`]
//! and [`verify_password_blocking`], which hop onto Tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::domain::{DomainError, InfraErrorKind};

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            DomainError::infra(
                InfraErrorKind::Other("hash".into()),
                format!("Failed to hash password: {e}"),
            )
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, DomainError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::Other("hash".into()),
            format!("Invalid stored password hash: {e}"),
        )
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash_password_blocking(password: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(join_failed)?
}

pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(join_failed)?
}

fn join_failed(e: tokio::task::JoinError) -> DomainError {
    DomainError::infra(
        InfraErrorKind::Other("join".into()),
        format!("Password task failed: {e}"),
    )
}
