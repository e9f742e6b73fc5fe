#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use bytes::Bytes;
use serde_json::{json, Value};
use wiremock::MockServer;

use resume_api::analysis::{AnalysisOrchestrator, AnalysisSnapshot, OrchestratorSettings};
use resume_api::extract::{DocumentTextExtractor, UploadedDocument, MIME_TEXT};
use resume_api::llm_client::{AnalysisGateway, GatewayClient, GatewayConfig};

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
pub const TEST_KEY: &str = "test-key";

static TRACING: Once = Once::new();

pub fn setup_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("resume_api=debug")
            .with_test_writer()
            .init();
    });
}

pub fn gateway_client(server: &MockServer, api_key: Option<&str>) -> GatewayClient {
    GatewayClient::new(GatewayConfig {
        api_key: api_key.map(String::from),
        endpoint: format!("{}{GENERATE_PATH}", server.uri()),
        timeout: Duration::from_secs(5),
        max_attempts: 1,
    })
    .unwrap()
}

/// Settings that keep wall-clock tests fast.
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        progress_tick: Duration::from_millis(10),
        min_analysis_duration: Duration::ZERO,
        ..OrchestratorSettings::default()
    }
}

pub fn orchestrator(gateway: Option<GatewayClient>) -> AnalysisOrchestrator {
    let gateway = gateway.map(|g| Arc::new(g) as Arc<dyn AnalysisGateway>);
    AnalysisOrchestrator::new(gateway, Arc::new(DocumentTextExtractor), fast_settings())
}

pub fn text_resume(text: String) -> UploadedDocument {
    UploadedDocument {
        file_name: "resume.txt".to_string(),
        content_type: Some(MIME_TEXT.to_string()),
        data: Bytes::from(text),
    }
}

/// Roughly 10 KB of plain-text resume.
pub fn ten_kb_resume() -> String {
    let mut text = String::from("JANE DOE\nSoftware Engineer\n\nEXPERIENCE\n");
    while text.len() < 10 * 1024 {
        text.push_str("- Improved application performance by 30% across 4 services\n");
    }
    text
}

/// Wraps model reply text in a generateContent response body.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

pub const ANALYSIS_REPLY: &str = "{\"score\":72,\"strengths\":[\"A\"],\"improvements\":[\"B\"],\"keywordMatch\":65,\"atsCompatibility\":78,\"skillRecommendations\":[],\"marketTrends\":[]}";

pub const RECOMMENDATIONS_REPLY: &str = r#"Here are your recommendations:
[
  {"id": "1", "type": "skill", "title": "Learn Kubernetes", "description": "Orchestration is in demand.",
   "relevanceScore": 92, "link": "https://kubernetes.io/docs/", "linkText": "Docs", "tags": ["Cloud"]},
  {"id": "1", "type": "job", "title": "Platform Engineer", "description": "Matches your CI/CD work.",
   "relevanceScore": 81, "tags": []}
]
Good luck!"#;

pub async fn settle(orch: &AnalysisOrchestrator) -> AnalysisSnapshot {
    let mut rx = orch.subscribe();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| !s.state.is_in_flight()),
    )
    .await
    .expect("analysis did not settle in time")
    .expect("session channel closed")
    .clone();
    snapshot
}
