//! Identity carried by a verified session.

use serde::{Deserialize, Serialize};

/// Decoded contents of a verified session token.
///
/// Inserted into request extensions by the auth gates and read back by the
/// `CurrentUser` / `MaybeUser` extractors.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// users.id of the session owner
    #[serde(rename = "sub")]
    pub user_id: i64,
    pub username: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// The parts of a user a session is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub username: String,
}
