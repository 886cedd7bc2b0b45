mod helpers;

use axum::http::StatusCode;
use helpers::{setup_test_app, setup_test_app_with, IMAGE_URL};
use serde_json::{json, Value};
use uuid::Uuid;

const SUBMISSIONS: &str = "/api/v2/submissions";

fn valid_body() -> Value {
    json!({
        "assignmentId": "A1",
        "studentId": "S1",
        "gradeLevel": "4",
        "imageUrl": IMAGE_URL,
    })
}

#[tokio::test]
async fn test_submission_succeeds() {
    let app = setup_test_app();

    let response = app.server.post(SUBMISSIONS).json(&valid_body()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Submission successful");
    let submission_id = Uuid::parse_str(body["submissionId"].as_str().unwrap()).unwrap();

    let keys = app.harness.storage.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("A1/S1/"));
    assert!(keys[0].ends_with(".jpg"));

    let records = app.harness.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].submission_id, submission_id);
    assert_eq!(records[0].grade_level.as_deref(), Some("4"));

    let events = app.harness.publisher.messages();
    assert_eq!(events.len(), 1);
    let event: Value = serde_json::from_slice(&events[0]).unwrap();
    assert_eq!(event["submission_id"], submission_id.to_string());
    assert_eq!(event["assignment_id"], "A1");
    assert_eq!(event["student_id"], "S1");
}

#[tokio::test]
async fn test_grade_level_is_optional() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .json(&json!({"assignmentId": "A1", "studentId": "S1", "imageUrl": IMAGE_URL}))
        .await;

    response.assert_status_ok();
    assert_eq!(app.harness.store.records()[0].grade_level, None);
}

#[tokio::test]
async fn test_missing_student_id_is_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .json(&json!({"assignmentId": "A1", "imageUrl": IMAGE_URL}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Missing required fields"}));
    assert!(app.harness.fetcher.requests().is_empty());
    assert!(app.harness.storage.keys().is_empty());
    assert!(app.harness.store.records().is_empty());
    assert!(app.harness.publisher.messages().is_empty());
}

#[tokio::test]
async fn test_invalid_image_url_is_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .json(&json!({"assignmentId": "A1", "studentId": "S1", "imageUrl": "not a url"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Invalid image URL"}));
}

#[tokio::test]
async fn test_path_like_identifiers_are_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .json(&json!({"assignmentId": "..", "studentId": "S1", "imageUrl": IMAGE_URL}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Invalid assignmentId or studentId"}));
    assert!(app.harness.storage.keys().is_empty());
}

#[tokio::test]
async fn test_failed_download_returns_bad_request() {
    let app = setup_test_app_with(|h| h.fetcher.respond(IMAGE_URL, 404, Vec::new()));

    let response = app.server.post(SUBMISSIONS).json(&valid_body()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Failed to download image"}));
    assert!(app.harness.storage.keys().is_empty());
    assert!(app.harness.store.records().is_empty());
    assert!(app.harness.publisher.messages().is_empty());
}

#[tokio::test]
async fn test_storage_failure_returns_server_error() {
    let app = setup_test_app_with(|h| h.storage.fail_puts());

    let response = app.server.post(SUBMISSIONS).json(&valid_body()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"message": "Failed to store image"}));
    assert!(app.harness.store.records().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_returns_server_error() {
    let app = setup_test_app_with(|h| h.store.fail_puts());

    let response = app.server.post(SUBMISSIONS).json(&valid_body()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"message": "Failed to save submission"}));
    assert!(app.harness.storage.keys().is_empty());
    assert!(app.harness.publisher.messages().is_empty());
}

#[tokio::test]
async fn test_publish_failure_returns_server_error() {
    let app = setup_test_app_with(|h| h.publisher.fail_publishes());

    let response = app.server.post(SUBMISSIONS).json(&valid_body()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"message": "Failed to publish submission"}));
    assert_eq!(app.harness.store.records().len(), 1);
}

#[tokio::test]
async fn test_repeated_submission_creates_new_records() {
    let app = setup_test_app();

    let first: Value = app.server.post(SUBMISSIONS).json(&valid_body()).await.json();
    let second: Value = app.server.post(SUBMISSIONS).json(&valid_body()).await.json();

    assert_ne!(first["submissionId"], second["submissionId"]);
    assert_eq!(app.harness.store.records().len(), 2);
    assert_eq!(app.harness.publisher.messages().len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Invalid request body"}));
}

#[tokio::test]
async fn test_oversized_body_gets_json_error() {
    let app = setup_test_app();
    let mut body = valid_body();
    body["gradeLevel"] = Value::String("4".repeat(128 * 1024));

    let response = app.server.post(SUBMISSIONS).json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"message": "Invalid request body"}));
    assert!(app.harness.fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = setup_test_app();

    let response = app.server.get("/api/v1/submissions").await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"message": "Not Found"}));
}

#[tokio::test]
async fn test_wrong_method_is_not_found() {
    let app = setup_test_app();

    let response = app.server.get(SUBMISSIONS).await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"message": "Not Found"}));
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({"status": "ok"}));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();

    let spec: Value = app.server.get("/api/openapi.json").await.json();

    assert!(spec["paths"][SUBMISSIONS]["post"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app();

    let response = app
        .server
        .post(SUBMISSIONS)
        .add_header("X-Request-ID", "req-42")
        .json(&valid_body())
        .await;

    assert_eq!(response.header("X-Request-ID"), "req-42");
}
