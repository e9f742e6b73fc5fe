//! LLM Client — the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the generative-AI endpoint
//! directly. All gateway interactions MUST go through this module.
//!
//! The credential is injected through `GatewayConfig` at construction and is
//! never read from the environment inside the call path.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::prompts::{build_analysis_prompt, build_recommendations_prompt};
use crate::models::analysis::{ensure_unique_ids, AnalysisResult, Recommendation};

pub mod json;

use json::{extract_json_array, extract_json_object};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gemini API key is not configured")]
    Configuration,

    #[error("Gateway request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Gateway returned no candidates")]
    EmptyResponse,

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for GatewayError {
    /// The request URL carries the API key as `?key=`, so it is dropped
    /// before the error can reach a log line.
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Http(e.without_url())
    }
}

impl GatewayError {
    /// Whether a repeated attempt could succeed (rate limits, server faults, transport).
    fn is_transient(&self) -> bool {
        match self {
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Http(_) => true,
            _ => false,
        }
    }
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Low temperature for repeatable scoring.
    pub const ANALYSIS: GenerationConfig = GenerationConfig {
        temperature: 0.2,
        top_p: 0.8,
        top_k: 40,
        max_output_tokens: 2048,
    };

    pub const RECOMMENDATIONS: GenerationConfig = GenerationConfig {
        temperature: 0.4,
        top_p: 0.8,
        top_k: 40,
        max_output_tokens: 2048,
    };
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    /// Attempts per logical call. 1 disables retries.
    pub max_attempts: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The two gateway calls the analysis orchestrator depends on.
///
/// Implemented by `GatewayClient`; tests substitute their own doubles.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze_resume(&self, resume_text: &str) -> Result<AnalysisResult, GatewayError>;

    async fn generate_recommendations(
        &self,
        resume_text: &str,
    ) -> Result<Vec<Recommendation>, GatewayError>;
}

/// Wraps the Gemini `generateContent` endpoint with JSON extraction helpers.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Sends one prompt and returns the model's free-form reply text.
    pub async fn call(
        &self,
        prompt: &str,
        generation_config: GenerationConfig,
    ) -> Result<String, GatewayError> {
        let api_key = self.api_key().ok_or(GatewayError::Configuration)?;

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "Gateway call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            attempt += 1;

            match self.send_once(api_key, &request_body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!("Gateway call failed: {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        api_key: &str,
        request_body: &GenerateContentRequest<'_>,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gateway returned {}: {}", status, message);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                GatewayError::MalformedResponse(format!("invalid response body: {}", e.without_url()))
            })?;

        if body.candidates.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        let text = body.text().ok_or(GatewayError::EmptyResponse)?;
        debug!("Gateway call succeeded: {} chars of reply text", text.len());
        Ok(text.to_string())
    }

    /// Calls the gateway and parses the JSON span located by `extract`.
    async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        generation_config: GenerationConfig,
        extract: fn(&str) -> Option<&str>,
    ) -> Result<T, GatewayError> {
        let text = self.call(prompt, generation_config).await?;
        parse_embedded_json(&text, extract)
    }
}

#[async_trait]
impl AnalysisGateway for GatewayClient {
    async fn analyze_resume(&self, resume_text: &str) -> Result<AnalysisResult, GatewayError> {
        let prompt = build_analysis_prompt(resume_text);
        self.call_json(&prompt, GenerationConfig::ANALYSIS, extract_json_object)
            .await
    }

    async fn generate_recommendations(
        &self,
        resume_text: &str,
    ) -> Result<Vec<Recommendation>, GatewayError> {
        let prompt = build_recommendations_prompt(resume_text);
        let mut recommendations: Vec<Recommendation> = self
            .call_json(&prompt, GenerationConfig::RECOMMENDATIONS, extract_json_array)
            .await?;
        ensure_unique_ids(&mut recommendations);
        Ok(recommendations)
    }
}

/// Locates the JSON span in free-form model output and deserializes it.
pub fn parse_embedded_json<T: DeserializeOwned>(
    text: &str,
    extract: fn(&str) -> Option<&str>,
) -> Result<T, GatewayError> {
    let span = extract(text).ok_or_else(|| {
        GatewayError::MalformedResponse("no JSON found in model reply".to_string())
    })?;
    serde_json::from_str(span).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}
