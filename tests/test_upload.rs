mod common;

use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use common::TestApp;

fn png_part(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec())
        .file_name(name)
        .mime_type("image/png")
}

#[tokio::test]
async fn upload_and_serve_file() {
    let app = TestApp::new();
    let server = app.server();

    let form = MultipartForm::new()
        .add_part("featuredImage", png_part("cover.png"))
        .add_part(
            "documents",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("programme.pdf")
                .mime_type("application/pdf"),
        );

    let body: Value = server
        .post("/api/v1/uploads")
        .authorization_bearer(app.editor_token())
        .multipart(form)
        .await
        .json();

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["field"], "featuredImage");
    assert_eq!(files[0]["name"], "cover.png");
    assert_eq!(files[0]["fileType"], "image/png");
    assert_eq!(app.storage.objects.lock().unwrap().len(), 2);

    let url = files[0]["url"].as_str().unwrap();
    assert!(url.starts_with("/api/v1/uploads/featuredImage-"));
    let served = server.get(url).await;
    served.assert_header("content-type", "image/png");
    assert_eq!(served.as_bytes().as_ref(), b"\x89PNG\r\n\x1a\nfake");
}

#[tokio::test]
async fn upload_rejects_disallowed_types() {
    let app = TestApp::new();
    let server = app.server_permissive();

    let form = MultipartForm::new().add_part(
        "documents",
        Part::bytes(b"MZ".to_vec())
            .file_name("setup.exe")
            .mime_type("application/x-msdownload"),
    );
    server
        .post("/api/v1/uploads")
        .authorization_bearer(app.editor_token())
        .multipart(form)
        .await
        .assert_status_bad_request();

    // Extension and MIME type must agree.
    let form = MultipartForm::new().add_part(
        "images",
        Part::bytes(b"fake".to_vec())
            .file_name("photo.png")
            .mime_type("application/pdf"),
    );
    server
        .post("/api/v1/uploads")
        .authorization_bearer(app.editor_token())
        .multipart(form)
        .await
        .assert_status_bad_request();

    assert!(app.storage.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_requires_auth() {
    let app = TestApp::new();
    app.server_permissive()
        .post("/api/v1/uploads")
        .multipart(MultipartForm::new().add_part("images", png_part("a.png")))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn serve_missing_file_is_not_found() {
    let app = TestApp::new();
    app.server_permissive()
        .get("/api/v1/uploads/images-0-missing.png")
        .await
        .assert_status_not_found();
}
