//! End-to-end tests through the axum router

use std::io::Write;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use phishguard::logic::features::{FEATURE_COUNT, FEATURE_VERSION};
use phishguard::{create_router, AppState, Config};

const ADMIN_TOKEN: &str = "s3cret";

fn state_with(config: Config) -> AppState {
    AppState::from_config(config).unwrap()
}

fn admin_config() -> Config {
    Config {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..Config::default()
    }
}

/// Linear model with constant output sigmoid(bias)
fn write_linear_manifest(dir: &Path, version: &str, bias: f32) -> std::path::PathBuf {
    let manifest = json!({
        "version": version,
        "schema_version": FEATURE_VERSION,
        "feature_count": FEATURE_COUNT,
        "trained_at": "2024-11-02",
        "model": {
            "kind": "linear",
            "weights": vec![0.0f32; FEATURE_COUNT],
            "bias": bias,
        }
    });
    let path = dir.join(format!("{}.json", version));
    std::fs::write(&path, manifest.to_string()).unwrap();
    path
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_post(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ============================================================================
// CHECK URL
// ============================================================================

#[tokio::test]
async fn check_url_without_model_uses_heuristics() {
    let app = create_router(state_with(Config::default()));

    let (status, body) = send(&app, post_json("/api/check-url", r#"{"url":"http://phish-bank-login.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "phishing");
    assert_eq!(body["usedMLModel"], false);
    assert_eq!(body["isZeroDay"], true);
    assert!(body["modelVersion"].is_null());
    assert!(body["confidenceScore"].is_null());
    assert_eq!(body["detectionSource"], "Heuristic Rules");
}

#[tokio::test]
async fn check_url_with_model() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(Config::default());
    // sigmoid(-2.944) ~= 0.05
    let path = write_linear_manifest(dir.path(), "v1.3-RF", -2.944_439);
    state.engine.registry().load(&path, FEATURE_VERSION).unwrap();
    let app = create_router(state);

    let (status, body) = send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "legitimate");
    assert_eq!(body["usedMLModel"], true);
    assert_eq!(body["isZeroDay"], false);
    assert_eq!(body["modelVersion"], "v1.3-RF");
    assert_eq!(body["detectionSource"], "ML Model");
    let confidence = body["confidenceScore"].as_f64().unwrap();
    assert!((confidence - 95.0).abs() < 0.01, "confidence was {}", confidence);
}

#[tokio::test]
async fn check_url_with_corrupt_model_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\x00\x01 definitely not a manifest").unwrap();

    let config = Config {
        model_path: Some(file.path().to_path_buf()),
        ..Config::default()
    };
    let state = state_with(config);
    assert!(state.engine.registry().current().is_none());
    let app = create_router(state);

    let (status, body) = send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedMLModel"], false);
    assert_eq!(body["detectionSource"], "Heuristic Rules");
}

#[tokio::test]
async fn check_url_rejects_bad_bodies() {
    let app = create_router(state_with(Config::default()));
    let long = format!(r#"{{"url":"http://{}.com"}}"#, "a".repeat(2100));

    for body in ["{}", "not json", r#"{"url":""}"#, r#"{"url":"   "}"#, r#"{"url":42}"#, long.as_str()] {
        let (status, json) = send(&app, post_json("/api/check-url", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(json["status"], 400);
        assert!(json["error"].is_string());
    }

    let (_, status) = send(&app, get("/api/status")).await;
    assert_eq!(status["engine"]["total"], 0);
}

#[tokio::test]
async fn known_threat_is_not_zero_day() {
    let mut feed = tempfile::NamedTempFile::new().unwrap();
    writeln!(feed, "# blocklist\nphish-bank-login.com").unwrap();

    let config = Config {
        threat_feed_paths: vec![feed.path().to_path_buf()],
        ..admin_config()
    };
    let app = create_router(state_with(config));

    let (status, sync) = send(&app, admin_post("/api/admin/feeds/sync", json!({}), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync["feeds_synced"], 1);
    assert_eq!(sync["total_indicators"], 1);

    let (_, body) = send(&app, post_json("/api/check-url", r#"{"url":"http://login.phish-bank-login.com/x"}"#)).await;
    assert_eq!(body["result"], "phishing");
    assert_eq!(body["isZeroDay"], false);
}

// ============================================================================
// STATUS
// ============================================================================

#[tokio::test]
async fn health_and_status() {
    let app = create_router(state_with(Config::default()));

    let (status, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["mode"], "heuristic");

    send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;

    let (status, body) = send(&app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["engine"]["total"], 1);
    assert_eq!(body["engine"]["heuristic_decisions"], 1);
    assert_eq!(body["registry"]["model_loaded"], false);
    assert_eq!(body["layout"]["feature_count"], FEATURE_COUNT);
    assert_eq!(body["heuristic_rules"], "heuristic-v1");

    let (status, _) = send(&app, get("/api/model")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// ADMIN
// ============================================================================

#[tokio::test]
async fn admin_routes_closed_without_configured_token() {
    let app = create_router(state_with(Config::default()));
    let (status, _) = send(&app, admin_post("/api/admin/model/reload", json!({}), Some("anything"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_routes_require_valid_token() {
    let app = create_router(state_with(admin_config()));

    let (status, _) = send(&app, admin_post("/api/admin/model/reload", json!({}), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, admin_post("/api/admin/model/reload", json!({}), Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authorized, but nothing to reload
    let (status, _) = send(&app, admin_post("/api/admin/model/reload", json!({}), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_load_activate_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let v1 = write_linear_manifest(dir.path(), "v1", -3.0);
    let v2 = write_linear_manifest(dir.path(), "v2", 3.0);
    let app = create_router(state_with(admin_config()));

    let (status, body) = send(&app, admin_post("/api/admin/model/load", json!({ "path": v1 }), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "v1");
    assert_eq!(body["checksum"].as_str().unwrap().len(), 64);

    let (status, _) = send(&app, admin_post("/api/admin/model/load", json!({ "path": v2 }), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, model) = send(&app, get("/api/model")).await;
    assert_eq!(model["version"], "v2");

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["mode"], "model");

    let (_, body) = send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;
    assert_eq!(body["result"], "phishing");
    assert_eq!(body["modelVersion"], "v2");

    let (status, _) = send(&app, admin_post("/api/admin/model/activate", json!({ "version": "v1" }), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;
    assert_eq!(body["result"], "legitimate");
    assert_eq!(body["modelVersion"], "v1");

    let (status, _) = send(&app, admin_post("/api/admin/model/activate", json!({ "version": "v9" }), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Reload re-reads the last loaded path (v2)
    let (status, body) = send(&app, admin_post("/api/admin/model/reload", json!({}), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "v2");
}

#[tokio::test]
async fn admin_load_failure_keeps_current_model() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_linear_manifest(dir.path(), "v1", -3.0);
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"version":"v2","schema_version":99,"feature_count":16,"model":{"kind":"linear","weights":[],"bias":0}}"#).unwrap();

    let app = create_router(state_with(admin_config()));
    send(&app, admin_post("/api/admin/model/load", json!({ "path": good }), Some(ADMIN_TOKEN))).await;

    let (status, body) = send(&app, admin_post("/api/admin/model/load", json!({ "path": bad }), Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);

    let (_, model) = send(&app, get("/api/model")).await;
    assert_eq!(model["version"], "v1");

    let (_, status) = send(&app, get("/api/status")).await;
    assert!(status["registry"]["last_error"].is_string());
}

// ============================================================================
// BUNDLED DEMO ASSETS
// ============================================================================

#[tokio::test]
async fn demo_assets_load() {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let config = Config {
        model_path: Some(demos.join("model.json")),
        heuristic_rules_path: Some(demos.join("rules.json")),
        threat_feed_paths: vec![demos.join("blocklist.txt")],
        ..Config::default()
    };
    let state = state_with(config);
    assert_eq!(state.engine.rules_version(), "heuristic-strict");
    assert_eq!(state.intel.sync_all().await.unwrap().total_indicators, 3);
    let app = create_router(state);

    let (_, body) = send(&app, post_json("/api/check-url", r#"{"url":"http://198.51.100.7/webscr/login"}"#)).await;
    assert_eq!(body["usedMLModel"], true);
    assert_eq!(body["modelVersion"], "v1.3-LR");
    assert_eq!(body["result"], "phishing");
    assert_eq!(body["isZeroDay"], false);

    let (_, body) = send(&app, post_json("/api/check-url", r#"{"url":"https://example.com"}"#)).await;
    assert_eq!(body["result"], "legitimate");
}
