//! Registration and credential checks.

use sea_orm::ConnectionTrait;
use tracing::{debug, info};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::logging::pii::Redacted;
use crate::repos::users::{self, User};

/// Raw registration form input
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Emails are compared case-insensitively and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Create a user. A second registration for the same email is a
/// `Conflict(UniqueEmail)` and leaves the existing user untouched.
pub async fn register<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    registration: Registration,
) -> Result<User, DomainError> {
    let username = registration.username.trim().to_string();
    let email = normalize_email(&registration.email);

    if username.is_empty() || email.is_empty() || registration.password.is_empty() {
        return Err(DomainError::validation(
            "Username, email and password are required",
        ));
    }
    if !looks_like_email(&email) {
        return Err(DomainError::validation("Email address is not valid"));
    }

    if users::find_user_by_email(conn, &email).await?.is_some() {
        debug!(email = %Redacted(&email), "registration rejected: email taken");
        return Err(DomainError::conflict(
            ConflictKind::UniqueEmail,
            "User already exists",
        ));
    }

    let password_hash = hash_password_blocking(registration.password).await?;
    // A concurrent registration can still hit the unique index; that maps to the same conflict.
    let user = users::create_user(conn, &username, &email, &password_hash).await?;

    info!(user_id = user.id, email = %Redacted(&user.email), "user registered");
    Ok(user)
}

/// Check an email/password pair. Unknown email and wrong password are
/// indistinguishable to the caller: both yield `Ok(None)`.
pub async fn authenticate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
    password: &str,
) -> Result<Option<User>, DomainError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some(user) = users::find_user_by_email(conn, &email).await? else {
        debug!(email = %Redacted(&email), "login failed: unknown email");
        return Ok(None);
    };

    if verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
        Ok(Some(user))
    } else {
        debug!(user_id = user.id, "login failed: password mismatch");
        Ok(None)
    }
}
