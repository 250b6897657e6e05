//! Session gates driven by the `token` cookie.
//!
//! `CheckUser` (soft) wraps the whole app: it resolves the cookie once and
//! stores a [`Caller`] in request extensions, with or without claims.
//! `RequireAuth` (hard) wraps protected resources and answers
//! `303 See Other -> /login` unless the request carries a valid session,
//! so the handler behind it never runs for anonymous callers.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth::cookie::TOKEN_COOKIE;
use crate::auth::{SessionBackend, SessionClaims, TokenRejection};
use crate::state::app_state::AppState;

pub const LOGIN_PATH: &str = "/login";

/// Identity attached to a request by the gates; `None` means anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Option<SessionClaims>);

/// Outcome of reading the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NoToken,
    TokenInvalid(TokenRejection),
    TokenValid(SessionClaims),
}

impl SessionState {
    pub fn into_claims(self) -> Option<SessionClaims> {
        match self {
            SessionState::TokenValid(claims) => Some(claims),
            SessionState::NoToken | SessionState::TokenInvalid(_) => None,
        }
    }
}

/// Read the `token` cookie and verify it against the session backend.
pub fn resolve_session(req: &HttpRequest, sessions: &dyn SessionBackend) -> SessionState {
    let Some(cookie) = req.cookie(TOKEN_COOKIE) else {
        return SessionState::NoToken;
    };
    if cookie.value().is_empty() {
        return SessionState::NoToken;
    }
    match sessions.verify(cookie.value()) {
        Ok(claims) => SessionState::TokenValid(claims),
        Err(reason) => {
            debug!(
                backend = sessions.name(),
                reason = reason.as_str(),
                "session token rejected"
            );
            SessionState::TokenInvalid(reason)
        }
    }
}

/// Claims for this request: reuse what `CheckUser` attached, otherwise resolve now.
fn claims_for(req: &ServiceRequest) -> Option<SessionClaims> {
    if let Some(Caller(Some(claims))) = req.extensions().get::<Caller>() {
        return Some(claims.clone());
    }
    let state = req.app_data::<web::Data<AppState>>()?;
    resolve_session(req.request(), state.sessions.as_ref()).into_claims()
}

/// Soft gate: attaches identity-or-absent and always continues.
pub struct CheckUser;

impl<S, B> Transform<S, ServiceRequest> for CheckUser
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CheckUserMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CheckUserMiddleware { service }))
    }
}

pub struct CheckUserMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CheckUserMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| {
                resolve_session(req.request(), state.sessions.as_ref()).into_claims()
            });

        req.extensions_mut().insert(Caller(claims));
        Box::pin(self.service.call(req))
    }
}

/// Hard gate: redirects to `/login` unless a valid session is present.
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware { service }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match claims_for(&req) {
            Some(claims) => {
                req.extensions_mut().insert(Caller(Some(claims)));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            None => {
                debug!(path = %req.path(), "unauthenticated request redirected to login");
                let redirect = HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, LOGIN_PATH))
                    .finish();
                let res = req.into_response(redirect).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
