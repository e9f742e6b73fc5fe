//! # HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use common::{fast_settings, setup_tracing};
use resume_api::analysis::{AnalysisOrchestrator, OrchestratorSettings};
use resume_api::config::{Config, DEFAULT_GEMINI_API_URL, DEFAULT_MAX_UPLOAD_BYTES};
use resume_api::extract::DocumentTextExtractor;
use resume_api::routes::build_router;
use resume_api::state::AppState;

const BOUNDARY: &str = "resume-api-test-boundary";
const ANALYSIS_URI: &str = "/api/v1/resume/analysis";

fn test_config() -> Config {
    Config {
        gemini_api_key: None,
        gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
        gemini_max_attempts: 1,
        gemini_timeout: Duration::from_secs(5),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        progress_tick: Duration::from_millis(10),
        min_analysis_duration: Duration::ZERO,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

fn app_with(settings: OrchestratorSettings) -> Router {
    let state = AppState {
        config: test_config(),
        analysis: AnalysisOrchestrator::new(None, std::sync::Arc::new(DocumentTextExtractor), settings),
    };
    build_router(state)
}

fn upload_request(file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(ANALYSIS_URI)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_until_settled(app: &Router) -> Value {
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(empty_request("GET", ANALYSIS_URI))
            .await
            .unwrap();
        let body = json_body(response).await;
        let state = body["state"].as_str().unwrap().to_string();
        if state == "complete" || state == "error" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("analysis did not settle");
}

#[tokio::test]
async fn test_health_reports_fallback_mode() {
    setup_tracing();
    let app = app_with(fast_settings());

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["analysis_mode"], "fallback");
}

#[tokio::test]
async fn test_upload_runs_fallback_analysis_to_completion() {
    setup_tracing();
    let app = app_with(fast_settings());

    let response = app
        .clone()
        .oneshot(upload_request("resume.txt", "text/plain", b"JANE DOE\nEngineer"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = json_body(response).await;
    assert_eq!(accepted["state"], "extracting");
    assert_eq!(accepted["source"], "fallback");

    let done = wait_until_settled(&app).await;
    assert_eq!(done["state"], "complete");
    assert_eq!(done["progress"], 100);
    assert_eq!(done["analysis"]["score"], 72);
    assert_eq!(done["analysis"]["keywordMatch"], 65);
    assert_eq!(done["recommendations"][0]["type"], "skill");
    assert_eq!(done["recommendations"][0]["relevanceScore"], 94);
}

#[tokio::test]
async fn test_unsupported_file_type_is_415() {
    setup_tracing();
    let app = app_with(fast_settings());

    let response = app
        .clone()
        .oneshot(upload_request("photo.png", "image/png", b"\x89PNG"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE_TYPE");

    let session = json_body(app.oneshot(empty_request("GET", ANALYSIS_URI)).await.unwrap()).await;
    assert_eq!(session["state"], "idle");
}

async fn assert_file_too_large(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    setup_tracing();
    let app = app_with(OrchestratorSettings {
        max_upload_bytes: 16,
        ..fast_settings()
    });

    let response = app
        .oneshot(upload_request("resume.txt", "text/plain", &[b'a'; 64]))
        .await
        .unwrap();

    assert_file_too_large(response).await;
}

#[tokio::test]
async fn test_upload_just_over_default_limit_is_413() {
    setup_tracing();
    let app = app_with(fast_settings());
    let data = vec![b'a'; DEFAULT_MAX_UPLOAD_BYTES + 1];

    let response = app
        .clone()
        .oneshot(upload_request("resume.txt", "text/plain", &data))
        .await
        .unwrap();

    assert_file_too_large(response).await;
    let session = json_body(app.oneshot(empty_request("GET", ANALYSIS_URI)).await.unwrap()).await;
    assert_eq!(session["state"], "idle");
}

#[tokio::test]
async fn test_upload_past_body_limit_is_413() {
    setup_tracing();
    let app = app_with(fast_settings());
    // Larger than the router's body cap, so the multipart stream itself fails.
    let data = vec![b'a'; 6 * 1024 * 1024];

    let response = app
        .oneshot(upload_request("resume.pdf", "application/pdf", &data))
        .await
        .unwrap();

    assert_file_too_large(response).await;
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    setup_tracing();
    let app = app_with(fast_settings());
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri(ANALYSIS_URI)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_second_upload_while_in_flight_is_409() {
    setup_tracing();
    let app = app_with(OrchestratorSettings {
        min_analysis_duration: Duration::from_secs(30),
        ..fast_settings()
    });

    let first = app
        .clone()
        .oneshot(upload_request("resume.txt", "text/plain", b"first"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = app
        .clone()
        .oneshot(upload_request("resume.txt", "text/plain", b"second"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Reset cancels the slow run and frees the slot.
    let reset = app
        .clone()
        .oneshot(empty_request("DELETE", ANALYSIS_URI))
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::NO_CONTENT);

    let third = app
        .oneshot(upload_request("resume.txt", "text/plain", b"third"))
        .await
        .unwrap();
    assert_eq!(third.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_feedback_endpoint() {
    setup_tracing();
    let app = app_with(fast_settings());
    app.clone()
        .oneshot(upload_request("resume.txt", "text/plain", b"JANE DOE"))
        .await
        .unwrap();
    wait_until_settled(&app).await;

    let feedback = |id: &str| {
        Request::builder()
            .method("POST")
            .uri(format!("{ANALYSIS_URI}/recommendations/{id}/feedback"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"helpful": true}"#))
            .unwrap()
    };

    let ok = app.clone().oneshot(feedback("1")).await.unwrap();
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let missing = app.clone().oneshot(feedback("42")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let session = json_body(app.oneshot(empty_request("GET", ANALYSIS_URI)).await.unwrap()).await;
    assert_eq!(session["feedback"]["1"], true);
}

#[tokio::test]
async fn test_reset_returns_session_to_idle() {
    setup_tracing();
    let app = app_with(fast_settings());
    app.clone()
        .oneshot(upload_request("resume.txt", "text/plain", b"JANE DOE"))
        .await
        .unwrap();
    wait_until_settled(&app).await;

    let reset = app
        .clone()
        .oneshot(empty_request("DELETE", ANALYSIS_URI))
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::NO_CONTENT);

    let session = json_body(app.oneshot(empty_request("GET", ANALYSIS_URI)).await.unwrap()).await;
    assert_eq!(session["state"], "idle");
    assert!(session["analysis"].is_null());
    assert_eq!(session["recommendations"], serde_json::json!([]));
}
