mod common;
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use common::{assert_see_other, read_view};
use notes_backend::config::SessionBackendKind;
use support::forms::form_request;
use support::session::{cookie_named, login, register, PASSWORD};
use support::{build_test_state, create_test_app};

#[actix_web::test]
async fn register_redirects_to_login() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let req = form_request(
        "/register",
        &[
            ("username", "alice"),
            ("email", "alice@example.test"),
            ("password", PASSWORD),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_see_other(&resp, "/login");
}

#[actix_web::test]
async fn duplicate_email_is_conflict() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let account = register(&app, "dup").await;

    // Same address, different case and username
    let upper = account.email.to_uppercase();
    let req = form_request(
        "/register",
        &[
            ("username", "someone-else"),
            ("email", upper.as_str()),
            ("password", "another password"),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    let problem =
        assert_problem_details_from_service_response(resp, "UNIQUE_EMAIL", StatusCode::CONFLICT)
            .await;
    assert_eq!(problem.detail, "User already exists");

    // The original password still works, so the first user was left alone
    let cookie = login(&app, &account).await;
    assert!(!cookie.value().is_empty());
}

#[actix_web::test]
async fn register_with_missing_fields_is_validation_error() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let req = form_request("/register", &[("email", "x@example.test")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "VALIDATION_ERROR",
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
}

#[actix_web::test]
async fn login_sets_http_only_token_cookie() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let account = register(&app, "cookie").await;

    let req = form_request(
        "/login",
        &[("email", account.email.as_str()), ("password", PASSWORD)],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_see_other(&resp, "/");

    let cookie = cookie_named(&resp, "token").expect("token cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.domain(), None);
}

#[actix_web::test]
async fn bad_credentials_redirect_back_with_error() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let account = register(&app, "badpw").await;

    for (email, password) in [
        (account.email.as_str(), "wrong password"),
        ("nobody@example.test", PASSWORD),
    ] {
        let req = form_request("/login", &[("email", email), ("password", password)]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_see_other(&resp, "/login?error=1");
        assert!(cookie_named(&resp, "token").is_none());
    }

    let req = test::TestRequest::get()
        .uri("/login?error=1")
        .to_request();
    let data = read_view(test::call_service(&app, req).await, "login").await;
    assert_eq!(data["error"], true);
}

#[actix_web::test]
async fn logout_clears_cookie() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let account = register(&app, "logout").await;
    let cookie = login(&app, &account).await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_see_other(&resp, "/");

    let cleared = cookie_named(&resp, "token").expect("logout should overwrite the cookie");
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
}

#[actix_web::test]
async fn logout_revokes_server_side_session() {
    let ts = build_test_state(SessionBackendKind::Memory).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let account = register(&app, "memlogout").await;
    let cookie = login(&app, &account).await;

    let req = test::TestRequest::get()
        .uri("/edit-note/1")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    // Authenticated: gets past the gate to the (missing) note
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie.clone())
        .to_request();
    test::call_service(&app, req).await;

    // Replaying the old cookie no longer authenticates
    let req = test::TestRequest::get()
        .uri("/edit-note/1")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_see_other(&resp, "/login");
}

#[actix_web::test]
async fn auth_pages_render() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/register").to_request();
    read_view(test::call_service(&app, req).await, "register").await;

    let req = test::TestRequest::get().uri("/login").to_request();
    let data = read_view(test::call_service(&app, req).await, "login").await;
    assert_eq!(data["error"], false);
}
