use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{SessionClaims, SessionIdentity};
use super::session::TokenRejection;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

pub(crate) fn unix_seconds(now: SystemTime) -> Result<i64, AppError> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| AppError::internal("Failed to get current time"))
}

/// Mint a HS256 session token valid for `security.session_ttl`.
pub fn mint_session_token(
    identity: &SessionIdentity,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = unix_seconds(now)?;
    let claims = SessionClaims {
        user_id: identity.user_id,
        username: identity.username.clone(),
        iat,
        exp: iat + security.session_ttl.as_secs() as i64,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify signature and expiry; failures are classified, never detailed.
pub fn verify_session_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<SessionClaims, TokenRejection> {
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = 0;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::InvalidSignature => TokenRejection::BadSignature,
        _ => TokenRejection::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{mint_session_token, verify_session_token};
    use crate::auth::claims::SessionIdentity;
    use crate::auth::session::TokenRejection;
    use crate::state::security_config::SecurityConfig;

    fn alice() -> SessionIdentity {
        SessionIdentity {
            user_id: 42,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn minted_token_verifies_with_same_identity() {
        let security = SecurityConfig::new("test_secret_key_for_testing_purposes_only");
        let now = SystemTime::now();

        let token = mint_session_token(&alice(), now, &security).unwrap();
        let claims = verify_session_token(&token, &security).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(
            claims.iat,
            now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
        );
        assert_eq!(claims.exp, claims.iat + 60 * 60);
    }

    #[test]
    fn token_past_its_hour_is_expired() {
        let security = SecurityConfig::new("test_secret_key_for_testing_purposes_only");
        let two_hours_ago = SystemTime::now() - Duration::from_secs(2 * 60 * 60);

        let token = mint_session_token(&alice(), two_hours_ago, &security).unwrap();

        assert_eq!(
            verify_session_token(&token, &security),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn other_secret_is_bad_signature() {
        let token =
            mint_session_token(&alice(), SystemTime::now(), &SecurityConfig::new("secret-A"))
                .unwrap();

        assert_eq!(
            verify_session_token(&token, &SecurityConfig::new("secret-B")),
            Err(TokenRejection::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let security = SecurityConfig::new("secret");
        assert_eq!(
            verify_session_token("not-a-jwt", &security),
            Err(TokenRejection::Malformed)
        );
        assert_eq!(
            verify_session_token("", &security),
            Err(TokenRejection::Malformed)
        );
    }
}
