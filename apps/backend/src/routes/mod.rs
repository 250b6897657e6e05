use actix_web::http::header;
use actix_web::{error, web, HttpResponse, HttpResponseBuilder};

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod auth;
pub mod health;
pub mod notes;

/// Form bodies (login, register, urlencoded notes) may carry long note content.
const FORM_LIMIT_BYTES: usize = 1024 * 1024;

/// `303 See Other` to `location`; the browser follows with a GET.
pub(crate) fn see_other(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

/// Register every route. `main.rs` and the test app builder both call this;
/// the soft gate and tracing middleware are wrapped around it by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_LIMIT_BYTES)
            .error_handler(|err, _req| {
                let detail = format!("Malformed form body: {err}");
                error::Error::from(AppError::bad_request(ErrorCode::BadRequest, detail))
            }),
    )
    .configure(health::configure_routes)
    .configure(auth::configure_routes)
    .configure(notes::configure_routes);
}
