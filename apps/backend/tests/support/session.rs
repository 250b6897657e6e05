//! Register/login flows driven through the real routes.

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, Error};
use backend_test_support::unique_helpers::{unique_email, unique_str};

use super::forms::form_request;

pub const PASSWORD: &str = "correct horse battery staple";

/// A registered account
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub email: String,
}

pub fn cookie_named(resp: &ServiceResponse<BoxBody>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub async fn register<S>(app: &S, prefix: &str) -> Account
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let account = Account {
        username: unique_str(prefix),
        email: unique_email(prefix),
    };
    let req = form_request(
        "/register",
        &[
            ("username", account.username.as_str()),
            ("email", account.email.as_str()),
            ("password", PASSWORD),
        ],
    )
    .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 303, "registration should redirect");
    account
}

/// Log in and return the session cookie to replay on later requests.
pub async fn login<S>(app: &S, account: &Account) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = form_request(
        "/login",
        &[("email", account.email.as_str()), ("password", PASSWORD)],
    )
    .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 303, "login should redirect");
    cookie_named(&resp, "token").expect("login should set the token cookie")
}

pub async fn register_and_login<S>(app: &S, prefix: &str) -> (Account, Cookie<'static>)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let account = register(app, prefix).await;
    let cookie = login(app, &account).await;
    (account, cookie)
}
