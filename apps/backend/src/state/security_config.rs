use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Sessions expire one hour after issuance regardless of backend.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Signing material and lifetime shared by every session backend
#[derive(Clone)]
pub struct SecurityConfig {
    /// Process-wide secret; signs JWTs and derives the memory backend's id key
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm (HS256)
    pub algorithm: Algorithm,
    pub session_ttl: Duration,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            session_ttl: SESSION_TTL,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
