use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use paperfeed_config::ServerConfig;
use paperfeed_core::{RawRow, RecordAssembler};
use paperfeed_db::{Database, PaperRepository};
use paperfeed_test_utils::{create_papers_db, create_untyped_papers_db, rows_for_date, sample_row};
use paperfeed_web::{router::build_router, state::AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const DATE: &str = "2025-07-15";

fn app_with(rows: &[RawRow]) -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = create_papers_db(dir.path(), rows).expect("fixture db");
    app_at(dir, path)
}

fn app_at(dir: TempDir, path: PathBuf) -> (TempDir, Router) {
    std::fs::write(dir.path().join("2025-07-15.html"), "<h1>feed</h1>").expect("index page");

    let db = Database::open(path).expect("open db");
    let server = ServerConfig {
        static_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let state = AppState::new(
        PaperRepository::new(Arc::new(db)),
        RecordAssembler::default(),
        server,
    );
    (dir, build_router(state))
}

fn twenty_five_papers() -> (TempDir, Router) {
    let mut rows = rows_for_date(DATE, 1, 25);
    rows.extend(rows_for_date("2025-07-16", 100, 3));
    app_with(&rows)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).method("GET").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn ids(body: &Value) -> Vec<i64> {
    body["papers"]
        .as_array()
        .expect("papers array")
        .iter()
        .map(|p| p["id"].as_i64().expect("integer id"))
        .collect()
}

#[tokio::test]
async fn test_first_page() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app, "/api/papers?date=2025-07-15&page=1&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), (1..=10).collect::<Vec<_>>());
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["total_papers"], 25);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_prev"], false);
}

#[tokio::test]
async fn test_last_page() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app, "/api/papers?date=2025-07-15&page=3&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), (21..=25).collect::<Vec<_>>());
    assert_eq!(body["has_next"], false);
    assert_eq!(body["has_prev"], true);
}

#[tokio::test]
async fn test_page_out_of_bounds() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app, "/api/papers?date=2025-07-15&page=4&limit=10").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Page 4 is out of bounds. Total pages: 3"}));
}

#[tokio::test]
async fn test_defaults_for_missing_or_garbage_numbers() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app.clone(), "/api/papers?date=2025-07-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);

    let (status, body) = get(app, "/api/papers?date=2025-07-15&page=abc&limit=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body).len(), 10);
}

#[tokio::test]
async fn test_validation_errors() {
    let (_dir, app) = twenty_five_papers();
    let cases = [
        ("/api/papers", "Date parameter is required (YYYY-MM-DD format)"),
        ("/api/papers?date=15-07-2025", "Invalid date format. Use YYYY-MM-DD"),
        ("/api/papers?date=2025-07-15&page=0", "Page must be >= 1"),
        ("/api/papers?date=2025-07-15&limit=0", "Limit must be between 1 and 100"),
        ("/api/papers?date=2025-07-15&limit=101", "Limit must be between 1 and 100"),
        ("/api/papers/count", "Date parameter is required (YYYY-MM-DD format)"),
    ];
    for (uri, message) in cases {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({ "error": message }), "{}", uri);
    }
}

#[tokio::test]
async fn test_empty_date_is_empty_envelope() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app, "/api/papers?date=2020-01-01&page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "papers": [],
            "page": 2,
            "limit": 10,
            "total_papers": 0,
            "total_pages": 0,
            "has_next": false,
            "has_prev": false
        })
    );
}

#[tokio::test]
async fn test_count() {
    let (_dir, app) = twenty_five_papers();
    let (status, body) = get(app.clone(), "/api/papers/count?date=2025-07-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"total_papers": 25}));

    let (_, body) = get(app, "/api/papers/count?date=2025-07-16").await;
    assert_eq!(body, json!({"total_papers": 3}));
}

#[tokio::test]
async fn test_records_are_assembled() {
    let (_dir, app) = twenty_five_papers();
    let (_, body) = get(app, "/api/papers?date=2025-07-15&limit=1").await;
    let paper = &body["papers"][0];

    assert_eq!(paper.as_object().expect("object").len(), 43);
    assert_eq!(paper["title"], "Paper 1 on \\(\\alpha\\)-divergence &lt;RLHF&gt;");
    assert_eq!(paper["abstract"], "We bound \\[x^2 \\leq y\\] &amp; more.");
    assert_eq!(paper["published_date"], DATE);
    assert_eq!(paper["authors"], json!(["Ada Lovelace", "Grace Hopper"]));
    assert_eq!(paper["diffusion_reasoning_score"], 0.0);
    assert_eq!(paper["recommendation_score"], Value::Null);
    assert_eq!(paper["author_h_indexes"][0].as_object().expect("entry").len(), 3);
}

#[tokio::test]
async fn test_bad_record_is_skipped_in_live_serving() {
    let rows = vec![
        sample_row(1, DATE),
        sample_row(2, DATE).with("summary", 42i64),
        sample_row(3, DATE),
    ];
    let dir = tempfile::tempdir().expect("tempdir");
    let path = create_untyped_papers_db(dir.path(), &rows).expect("fixture db");
    let (_dir, app) = app_at(dir, path);
    let (status, body) = get(app, "/api/papers?date=2025-07-15").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 3]);
    assert_eq!(body["total_papers"], 3);
}

#[tokio::test]
async fn test_index_and_not_found() {
    let (_dir, app) = twenty_five_papers();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    assert_eq!(&body[..], b"<h1>feed</h1>");

    let (status, body) = get(app, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Endpoint not found"}));
}

#[tokio::test]
async fn test_favicon_ico_serves_png() {
    let (dir, app) = twenty_five_papers();

    let (status, body) = get(app.clone(), "/favicon.ico").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Endpoint not found"}));

    let png = b"\x89PNG\r\n\x1a\nicon";
    std::fs::write(dir.path().join("favicon.png"), png).expect("favicon");

    let response = app
        .oneshot(Request::builder().uri("/favicon.ico").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    assert_eq!(&body[..], &png[..]);
}
