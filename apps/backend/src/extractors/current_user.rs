use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::SessionClaims;
use crate::error::AppError;
use crate::middleware::auth_gate::{resolve_session, Caller};
use crate::state::app_state::AppState;

/// Claims attached by the gates, falling back to reading the cookie when
/// neither gate ran for this route.
fn caller_claims(req: &HttpRequest) -> Option<SessionClaims> {
    if let Some(Caller(claims)) = req.extensions().get::<Caller>() {
        return claims.clone();
    }
    let state = req.app_data::<web::Data<AppState>>()?;
    resolve_session(req, state.sessions.as_ref()).into_claims()
}

/// Verified caller on a hard-gated route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub SessionClaims);

impl CurrentUser {
    pub fn claims(&self) -> &SessionClaims {
        &self.0
    }

    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            caller_claims(req)
                .map(CurrentUser)
                .ok_or_else(AppError::unauthorized),
        )
    }
}

/// Caller identity on a soft-gated route; never rejects
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaybeUser(pub Option<SessionClaims>);

impl MaybeUser {
    pub fn claims(&self) -> Option<&SessionClaims> {
        self.0.as_ref()
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(caller_claims(req))))
    }
}
