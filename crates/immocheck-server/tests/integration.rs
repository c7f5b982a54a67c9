use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap an initialized ImmoCheck workspace in the temp directory.
fn init_workspace(dir: &TempDir) {
    let config = immocheck_core::config::Config::new("test-agency");
    config.save(dir.path()).unwrap();
}

fn router(dir: &TempDir) -> axum::Router {
    immocheck_server::build_router(dir.path()).unwrap()
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn request_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let req = match body {
        Some(value) => builder
            .body(axum::body::Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn upsert(app: axum::Router, property: &str, building: Option<&str>, unit: &str, occupant: &str) {
    let (status, _) = request_json(
        app,
        "POST",
        "/api/directory",
        Some(serde_json::json!({
            "property": property,
            "building": building,
            "unit": unit,
            "occupant": occupant,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn directory_starts_empty() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, body) = get(router(&dir), "/api/directory").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upsert_then_list_and_find() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Canterane", Some("A"), "10", "Jean").await;

    let (status, body) = get(app.clone(), "/api/directory").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"][0]["occupant"], "Jean");

    let (status, body) = get(
        app,
        "/api/directory/occupant?property=Canterane&building=A&unit=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["occupant"], "Jean");
}

#[tokio::test]
async fn second_upsert_wins() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Canterane", Some("A"), "10", "Lolo").await;
    upsert(app.clone(), "Canterane", Some("A"), "10", "Jean").await;

    let (_, body) = get(app.clone(), "/api/directory").await;
    assert_eq!(body["records"].as_array().unwrap().len(), 1);

    let (_, body) = get(
        app,
        "/api/directory/occupant?property=Canterane&building=A&unit=10",
    )
    .await;
    assert_eq!(body["occupant"], "Jean");
}

#[tokio::test]
async fn find_unknown_unit_is_null() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, body) = get(
        router(&dir),
        "/api/directory/occupant?property=Canterane&building=A&unit=99",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["occupant"].is_null());
}

#[tokio::test]
async fn upsert_unknown_property_is_404() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, body) = request_json(
        router(&dir),
        "POST",
        "/api/directory",
        Some(serde_json::json!({
            "property": "Nulle Part",
            "building": null,
            "unit": "1",
            "occupant": "X",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Nulle Part"));
}

#[tokio::test]
async fn upsert_wrong_building_is_400() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, _) = request_json(
        router(&dir),
        "POST",
        "/api/directory",
        Some(serde_json::json!({
            "property": "Canterane",
            "building": "Z",
            "unit": "1",
            "occupant": "X",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn remove_by_name_hits_every_unit() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Canterane", Some("A"), "10", "Sam").await;
    upsert(app.clone(), "Canterane", Some("B"), "10", "Sam").await;
    upsert(app.clone(), "Canterane", Some("A"), "11", "Ana").await;

    let (status, body) =
        request_json(app.clone(), "DELETE", "/api/directory/by-name/Sam", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, body) = get(app, "/api/directory").await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["occupant"], "Ana");
}

#[tokio::test]
async fn remove_unknown_name_is_404() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, _) =
        request_json(router(&dir), "DELETE", "/api/directory/by-name/Nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_by_key_leaves_same_name_elsewhere() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Canterane", Some("A"), "10", "Sam").await;
    upsert(app.clone(), "Canterane", Some("B"), "10", "Sam").await;

    let (status, body) = request_json(
        app.clone(),
        "DELETE",
        "/api/directory?property=Canterane&building=A&unit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, body) = get(app, "/api/directory").await;
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn refresh_reports_row_count() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Les Glycines", None, "3", "Ana").await;
    let (status, body) = request_json(app, "POST", "/api/directory/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 1);
}

// ---------------------------------------------------------------------------
// Letters / history / config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn letter_uses_directory_occupant() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let app = router(&dir);

    upsert(app.clone(), "Canterane", Some("A"), "10", "Jean").await;

    let (status, body) = request_json(
        app,
        "POST",
        "/api/letter",
        Some(serde_json::json!({
            "kind": "email",
            "property": "Canterane",
            "building": "A",
            "unit": "10",
            "issue": "water stain on the ceiling",
            "liability": "owner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let letter = body["letter"].as_str().unwrap();
    assert!(letter.contains("Dear Jean,"));
    assert!(letter.contains("landlord's expense"));
}

#[tokio::test]
async fn letter_without_issue_is_400() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, _) = request_json(
        router(&dir),
        "POST",
        "/api/letter",
        Some(serde_json::json!({
            "property": "Canterane",
            "building": "A",
            "unit": "10",
            "issue": "  ",
            "liability": "owner",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_starts_empty() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, body) = get(router(&dir), "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn config_exposes_sites_but_no_secrets() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, body) = get(router(&dir), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"], "test-agency");
    assert_eq!(body["properties"][0]["name"], "Canterane");
    assert!(body.get("model").is_none());
    assert!(body.get("sheet").is_none());
}

#[tokio::test]
async fn diagnose_without_note_is_400() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    let (status, _) = request_json(
        router(&dir),
        "POST",
        "/api/diagnose",
        Some(serde_json::json!({
            "property": "Canterane",
            "building": "A",
            "unit": "10",
            "note": "",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Diagnose against a mocked model endpoint
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn diagnose_end_to_end_with_mock_model() {
    let dir = TempDir::new().unwrap();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/models")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"models": [{"name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent"]}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"candidates": [{"content": {"parts": [{"text": "Aging seal.\nVERDICT: OWNER"}]}}]}"#,
        )
        .create_async()
        .await;

    let mut config = immocheck_core::config::Config::new("test-agency");
    config.model.api_base = server.url();
    config.model.api_key_env = "IMMOCHECK_TEST_MODEL_KEY".to_string();
    config.save(dir.path()).unwrap();
    std::env::set_var("IMMOCHECK_TEST_MODEL_KEY", "test-key");

    let app = router(&dir);
    upsert(app.clone(), "Canterane", Some("A"), "10", "Jean").await;

    let (status, body) = request_json(
        app,
        "POST",
        "/api/diagnose",
        Some(serde_json::json!({
            "property": "Canterane",
            "building": "A",
            "unit": "10",
            "note": "water stain on the ceiling",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liability"], "owner");
    assert_eq!(body["model"], "gemini-2.5-flash");
    assert_eq!(body["occupant"], "Jean");
    assert!(body["letter"].as_str().unwrap().contains("Dear Jean,"));

    // The verdict landed in the history ledger.
    let (_, body) = get(router(&dir), "/api/history").await;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["liability"], "owner");
}
