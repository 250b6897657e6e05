//! Pluggable session backends behind the `token` cookie.
//!
//! `JwtSessions` is stateless: the cookie is the session. `MemorySessions`
//! keeps claims server-side and hands out `<id>.<sig>` where `sig` is a
//! keyed BLAKE3 hash of the id under a key derived from the process secret.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::claims::{SessionClaims, SessionIdentity};
use super::jwt::{mint_session_token, unix_seconds, verify_session_token};
use crate::config::SessionBackendKind;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

const MEMORY_KEY_CONTEXT: &str = "notes-backend 2026-10-18 memory session ids";

/// Why a presented token did not yield a session. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("expired")]
    Expired,
    /// Correctly signed, but the server no longer holds the session
    #[error("revoked")]
    Revoked,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::Expired => "expired",
            TokenRejection::Revoked => "revoked",
        }
    }
}

pub trait SessionBackend: Send + Sync + fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn issue(&self, identity: &SessionIdentity, now: SystemTime) -> Result<String, AppError>;

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection>;

    /// Forget the session behind `token`, if the backend holds any state for it
    fn invalidate(&self, token: &str);
}

pub fn build_session_backend(
    kind: SessionBackendKind,
    security: &SecurityConfig,
) -> Arc<dyn SessionBackend> {
    match kind {
        SessionBackendKind::Jwt => Arc::new(JwtSessions::new(security.clone())),
        SessionBackendKind::Memory => Arc::new(MemorySessions::new(security)),
    }
}

#[derive(Debug, Clone)]
pub struct JwtSessions {
    security: SecurityConfig,
}

impl JwtSessions {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security }
    }
}

impl SessionBackend for JwtSessions {
    fn name(&self) -> &'static str {
        "jwt"
    }

    fn issue(&self, identity: &SessionIdentity, now: SystemTime) -> Result<String, AppError> {
        mint_session_token(identity, now, &self.security)
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        verify_session_token(token, &self.security)
    }

    fn invalidate(&self, _token: &str) {
        // Stateless: the token stays valid until expiry; logout clears the cookie.
        debug!(backend = "jwt", "session invalidation is a no-op");
    }
}

pub struct MemorySessions {
    key: [u8; 32],
    ttl: Duration,
    sessions: DashMap<String, SessionClaims>,
}

impl fmt::Debug for MemorySessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySessions")
            .field("ttl", &self.ttl)
            .field("live", &self.sessions.len())
            .finish()
    }
}

impl MemorySessions {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            key: blake3::derive_key(MEMORY_KEY_CONTEXT, &security.jwt_secret),
            ttl: security.session_ttl,
            sessions: DashMap::new(),
        }
    }

    /// Number of sessions currently held
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn sign(&self, id: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key, id.as_bytes())
    }

    /// Split `<id>.<sig>` and check the signature; returns the id
    fn authenticate<'t>(&self, token: &'t str) -> Result<&'t str, TokenRejection> {
        let (id, sig) = token.split_once('.').ok_or(TokenRejection::Malformed)?;
        if id.is_empty() {
            return Err(TokenRejection::Malformed);
        }
        let presented = blake3::Hash::from_hex(sig).map_err(|_| TokenRejection::Malformed)?;
        // blake3::Hash equality is constant-time
        if presented != self.sign(id) {
            return Err(TokenRejection::BadSignature);
        }
        Ok(id)
    }
}

impl SessionBackend for MemorySessions {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn issue(&self, identity: &SessionIdentity, now: SystemTime) -> Result<String, AppError> {
        let iat = unix_seconds(now)?;
        let claims = SessionClaims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        // Drop anything that expired since the last login
        self.sessions.retain(|_, held| held.exp >= iat);

        let id = Uuid::new_v4().simple().to_string();
        let token = format!("{id}.{}", self.sign(&id).to_hex());
        self.sessions.insert(id, claims);
        Ok(token)
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        let id = self.authenticate(token)?;
        let claims = self
            .sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(TokenRejection::Revoked)?;

        let now = unix_seconds(SystemTime::now()).map_err(|_| TokenRejection::Expired)?;
        if claims.exp < now {
            self.sessions.remove(id);
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }

    fn invalidate(&self, token: &str) {
        if let Ok(id) = self.authenticate(token) {
            self.sessions.remove(id);
        }
    }
}
