#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// `Location` of a redirect response; panics when absent.
pub fn location(resp: &ServiceResponse<BoxBody>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect should carry a Location header")
        .to_string()
}

/// Assert a `303 See Other` to `expected`.
pub fn assert_see_other(resp: &ServiceResponse<BoxBody>, expected: &str) {
    assert_eq!(resp.status().as_u16(), 303, "expected 303 See Other");
    assert_eq!(location(resp), expected);
}

/// Parse a rendered view model and check its view name; returns `data`.
pub async fn read_view(resp: ServiceResponse<BoxBody>, expected_view: &str) -> Value {
    assert_eq!(resp.status().as_u16(), 200, "view should render with 200");
    let body = test::read_body(resp).await;
    let json: Value = serde_json::from_slice(&body).expect("view model should be JSON");
    assert_eq!(json["view"], expected_view);
    json["data"].clone()
}

/// Note titles in the order the index listed them.
pub fn titles(data: &Value) -> Vec<String> {
    data["notes"]
        .as_array()
        .expect("notes should be an array")
        .iter()
        .map(|n| n["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
