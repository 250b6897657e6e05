use std::time::SystemTime;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use super::see_other;
use crate::auth::cookie::{clear_session_cookie, session_cookie, TOKEN_COOKIE};
use crate::auth::SessionIdentity;
use crate::error::AppError;
use crate::middleware::auth_gate::LOGIN_PATH;
use crate::services::users::{self, Registration};
use crate::state::app_state::AppState;
use crate::views::{render, LoginView, RegisterView, LOGIN, REGISTER};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterForm {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

async fn register_page() -> HttpResponse {
    render(REGISTER, &RegisterView::default())
}

/// Duplicate email answers 409; success sends the browser to the login page.
async fn register(
    app_state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let form = form.into_inner();
    users::register(
        db,
        Registration {
            username: form.username,
            email: form.email,
            password: form.password,
        },
    )
    .await?;

    Ok(see_other(LOGIN_PATH).finish())
}

async fn login_page(query: web::Query<LoginQuery>) -> HttpResponse {
    render(
        LOGIN,
        &LoginView {
            error: query.error.is_some(),
        },
    )
}

async fn login(
    app_state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;

    let Some(user) = users::authenticate(db, &form.email, &form.password).await? else {
        return Ok(see_other("/login?error=1").finish());
    };

    let token = app_state.sessions.issue(
        &SessionIdentity {
            user_id: user.id,
            username: user.username.clone(),
        },
        SystemTime::now(),
    )?;
    info!(
        user_id = user.id,
        backend = app_state.sessions.name(),
        "session issued"
    );

    Ok(see_other("/").cookie(session_cookie(token)).finish())
}

async fn logout(req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        app_state.sessions.invalidate(cookie.value());
    }
    see_other("/").cookie(clear_session_cookie()).finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/register")
            .route(web::get().to(register_page))
            .route(web::post().to(register)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(login_page))
            .route(web::post().to(login)),
    )
    .route("/logout", web::get().to(logout));
}
