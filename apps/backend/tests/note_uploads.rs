mod common;
mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use common::{assert_see_other, read_view, titles};
use notes_backend::assets::MAX_UPLOAD_BYTES;
use notes_backend::config::SessionBackendKind;
use serde_json::Value;
use support::forms::{multipart_request, FilePart};
use support::session::register_and_login;
use support::test_state::TestState;
use support::{build_test_state, create_test_app};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn png<'a>(bytes: &'a [u8]) -> FilePart<'a> {
    FilePart {
        file_name: "photo.png",
        content_type: "image/png",
        bytes,
    }
}

#[actix_web::test]
async fn uploaded_image_is_stored_and_kept_across_updates() {
    let TestState { state, uploads } = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(state).with_prod_routes().build().await;
    let (_, cookie) = register_and_login(&app, "upload").await;

    let req = multipart_request(
        "/add-note",
        &[("title", "Holiday"), ("content", "beach")],
        Some(png(PNG)),
    )
    .cookie(cookie.clone())
    .to_request();
    assert_see_other(&test::call_service(&app, req).await, "/");

    let req = test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request();
    let index = read_view(test::call_service(&app, req).await, "index").await;
    let note = &index["notes"][0];
    let id = note["id"].as_i64().expect("note id");
    let image_ref = note["image_ref"].as_str().expect("image ref").to_string();
    assert!(image_ref.starts_with("/uploads/"));
    assert!(image_ref.ends_with(".png"));

    let stored = uploads.path().join(image_ref.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(&stored).expect("stored file"), PNG);

    // No new file: the image stays
    let req = multipart_request(
        &format!("/update-note/{id}"),
        &[("title", "Holiday"), ("content", "beach, day two")],
        Some(png(b"")),
    )
    .cookie(cookie.clone())
    .to_request();
    assert_see_other(&test::call_service(&app, req).await, "/");

    let req = test::TestRequest::get()
        .uri(&format!("/view-note/{id}"))
        .cookie(cookie.clone())
        .to_request();
    let data = read_view(test::call_service(&app, req).await, "view").await;
    assert_eq!(data["note"]["image_ref"], image_ref.as_str());
    assert_eq!(data["note"]["content"], "beach, day two");

    // A new file replaces the reference
    let req = multipart_request(
        &format!("/update-note/{id}"),
        &[("title", "Holiday"), ("content", "beach")],
        Some(png(b"second image")),
    )
    .cookie(cookie.clone())
    .to_request();
    assert_see_other(&test::call_service(&app, req).await, "/");

    let req = test::TestRequest::get()
        .uri(&format!("/view-note/{id}"))
        .cookie(cookie)
        .to_request();
    let data = read_view(test::call_service(&app, req).await, "view").await;
    let replaced = data["note"]["image_ref"].as_str().expect("image ref");
    assert_ne!(replaced, image_ref);
}

#[actix_web::test]
async fn empty_file_part_means_no_image() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let (_, cookie) = register_and_login(&app, "nofile").await;

    let req = multipart_request(
        "/add-note",
        &[("title", "Plain"), ("content", "text only")],
        Some(png(b"")),
    )
    .cookie(cookie.clone())
    .to_request();
    assert_see_other(&test::call_service(&app, req).await, "/");

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let index = read_view(test::call_service(&app, req).await, "index").await;
    assert_eq!(index["notes"][0]["image_ref"], Value::Null);
}

#[actix_web::test]
async fn oversized_upload_is_rejected_and_nothing_is_saved() {
    let ts = build_test_state(SessionBackendKind::Jwt).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let (_, cookie) = register_and_login(&app, "huge").await;

    let huge = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let req = multipart_request(
        "/add-note",
        &[("title", "Too big"), ("content", "x")],
        Some(png(&huge)),
    )
    .cookie(cookie.clone())
    .to_request();
    assert_problem_details_from_service_response(
        test::call_service(&app, req).await,
        "UPLOAD_TOO_LARGE",
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let index = read_view(test::call_service(&app, req).await, "index").await;
    assert!(titles(&index).is_empty());
}
