mod common;

use serde_json::{json, Value};

use common::TestApp;

#[tokio::test]
async fn settings_theme_round_trip() {
    let app = TestApp::new();
    let server = app.server();
    let theme = json!({
        "headerColor": "#1d1d1f",
        "footerColor": "#000",
        "headerTextColor": "#ffffff",
        "footerTextColor": "#f5f5f7"
    });

    server
        .put("/api/v1/settings/theme")
        .authorization_bearer(app.editor_token())
        .json(&theme)
        .await;

    let stored: Value = server.get("/api/v1/settings/theme").await.json();
    assert_eq!(stored, theme);
}

#[tokio::test]
async fn settings_theme_rejects_non_hex_colors() {
    let app = TestApp::new();
    app.server_permissive()
        .put("/api/v1/settings/theme")
        .authorization_bearer(app.editor_token())
        .json(&json!({
            "headerColor": "red",
            "footerColor": "#000",
            "headerTextColor": "#fff",
            "footerTextColor": "#fff"
        }))
        .await
        .assert_status_bad_request();
    assert!(app.settings.theme.lock().unwrap().is_none());
}

#[tokio::test]
async fn settings_text_requires_auth() {
    let app = TestApp::new();
    let body = json!({ "isPlaying": true, "active": true, "text": "Tickets on sale" });

    app.server_permissive()
        .put("/api/v1/settings/text")
        .json(&body)
        .await
        .assert_status_unauthorized();

    let server = app.server();
    server
        .put("/api/v1/settings/text")
        .authorization_bearer(app.editor_token())
        .json(&body)
        .await;
    let stored: Value = server.get("/api/v1/settings/text").await.json();
    assert_eq!(stored, body);
}

#[tokio::test]
async fn settings_header_keeps_logo_when_omitted() {
    let app = TestApp::new();
    let server = app.server();
    let token = app.editor_token();

    server
        .put("/api/v1/settings/header")
        .authorization_bearer(&token)
        .json(&json!({
            "routes": [{ "label": "Home", "path": "/" }],
            "buttons": [],
            "logoImgPath": "/api/v1/uploads/logoImg-1-a.png"
        }))
        .await;
    let updated: Value = server
        .put("/api/v1/settings/header")
        .authorization_bearer(&token)
        .json(&json!({
            "routes": [{ "label": "Home", "path": "/" }, { "label": "News", "path": "/news" }],
            "buttons": [{ "label": "Tickets" }]
        }))
        .await
        .json();

    assert_eq!(updated["logoImgPath"], "/api/v1/uploads/logoImg-1-a.png");
    assert_eq!(updated["routes"].as_array().unwrap().len(), 2);

    let stored: Value = server.get("/api/v1/settings/header").await.json();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn settings_footer_upsert() {
    let app = TestApp::new();

    app.server_permissive()
        .get("/api/v1/settings/footer")
        .await
        .assert_status_not_found();

    let server = app.server();
    let token = app.editor_token();
    server
        .put("/api/v1/settings/footer")
        .authorization_bearer(&token)
        .json(&json!([
            { "company": "Acme Hall", "url": "https://acme.example", "src": "/logo-a.png" },
            { "company": "Riverside", "description": "Partner venue" }
        ]))
        .await;

    let updated: Value = server
        .put("/api/v1/settings/footer")
        .authorization_bearer(&token)
        .json(&json!([
            { "id": 1, "company": "Acme Concert Hall", "url": "https://acme.example" }
        ]))
        .await
        .json();

    let companies = updated.as_array().unwrap();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0]["company"], "Acme Concert Hall");
    assert_eq!(companies[0]["src"], "/logo-a.png");
    assert_eq!(companies[1]["company"], "Riverside");
}
