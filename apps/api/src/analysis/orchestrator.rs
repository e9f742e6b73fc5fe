//! Analysis Orchestrator — drives one resume through extraction and AI analysis.
//!
//! Flow: submit → uploading → extracting → analyzing → complete | error.
//!
//! Session state lives in a `watch` channel: every transition and progress
//! tick is published to subscribers. At most one analysis is in flight; a
//! second submit is rejected until the first settles or is reset. Each run
//! carries a run id so a cancelled task can never write into a newer session.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::analysis::fallback::{mock_analysis, mock_recommendations};
use crate::config::Config;
use crate::errors::AppError;
use crate::extract::{DocumentError, DocumentKind, TextExtractor, UploadedDocument};
use crate::llm_client::{AnalysisGateway, GatewayError};
use crate::models::analysis::{AnalysisResult, Recommendation};

/// The single message shown to users for any failed run.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "An error occurred while analyzing your resume. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Uploading,
    Extracting,
    Analyzing,
    Complete,
    Error,
}

impl AnalysisState {
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            AnalysisState::Uploading | AnalysisState::Extracting | AnalysisState::Analyzing
        )
    }
}

/// Where the results of a run come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Gateway,
    Fallback,
}

/// Point-in-time view of the analysis session.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    #[serde(skip)]
    run_id: u64,
    pub state: AnalysisState,
    /// 0 – 100. Heartbeat only: capped at the ceiling until completion.
    pub progress: u8,
    pub source: Option<AnalysisSource>,
    pub file_name: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub recommendations: Vec<Recommendation>,
    /// Recommendation id → helpful?
    pub feedback: BTreeMap<String, bool>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisSnapshot {
    fn idle() -> Self {
        Self {
            run_id: 0,
            state: AnalysisState::Idle,
            progress: 0,
            source: None,
            file_name: None,
            analysis: None,
            recommendations: Vec::new(),
            feedback: BTreeMap::new(),
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    fn uploading(run_id: u64, file_name: &str, source: AnalysisSource) -> Self {
        Self {
            run_id,
            state: AnalysisState::Uploading,
            source: Some(source),
            file_name: Some(file_name.to_string()),
            started_at: Some(Utc::now()),
            ..Self::idle()
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_upload_bytes: usize,
    pub progress_tick: Duration,
    pub progress_step: u8,
    pub progress_ceiling: u8,
    /// Lower bound on time spent in `analyzing`, so progress stays visible.
    pub min_analysis_duration: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: crate::config::DEFAULT_MAX_UPLOAD_BYTES,
            progress_tick: Duration::from_millis(800),
            progress_step: 5,
            progress_ceiling: 90,
            min_analysis_duration: Duration::from_millis(3000),
        }
    }
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            progress_tick: config.progress_tick,
            min_analysis_duration: config.min_analysis_duration,
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
enum AnalysisError {
    #[error("text extraction failed: {0}")]
    Extraction(#[from] DocumentError),

    #[error("gateway call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("run was superseded")]
    Superseded,
}

struct Inner {
    gateway: Option<Arc<dyn AnalysisGateway>>,
    extractor: Arc<dyn TextExtractor>,
    settings: OrchestratorSettings,
    session: watch::Sender<AnalysisSnapshot>,
    task: Mutex<Option<AbortHandle>>,
    next_run_id: AtomicU64,
}

/// Owns the analysis session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    inner: Arc<Inner>,
}

impl AnalysisOrchestrator {
    /// `gateway = None` selects the fallback path: mock data, no network calls.
    pub fn new(
        gateway: Option<Arc<dyn AnalysisGateway>>,
        extractor: Arc<dyn TextExtractor>,
        settings: OrchestratorSettings,
    ) -> Self {
        let (session, _) = watch::channel(AnalysisSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                gateway,
                extractor,
                settings,
                session,
                task: Mutex::new(None),
                next_run_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn uses_fallback(&self) -> bool {
        self.inner.gateway.is_none()
    }

    /// Upload ceiling enforced by `submit`; the router sizes its body limit from it.
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.settings.max_upload_bytes
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.inner.session.borrow().clone()
    }

    /// Receives every state transition and progress tick.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.inner.session.subscribe()
    }

    /// Validates the document and starts an analysis run in the background.
    ///
    /// Returns the session right after the upload was accepted (`extracting`).
    pub fn submit(&self, document: UploadedDocument) -> Result<AnalysisSnapshot, AppError> {
        let kind = document.validate(self.inner.settings.max_upload_bytes)?;

        let source = if self.uses_fallback() {
            AnalysisSource::Fallback
        } else {
            AnalysisSource::Gateway
        };
        let run_id = self.inner.next_run_id.fetch_add(1, Ordering::Relaxed);

        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);

        let accepted = self.inner.session.send_if_modified(|s| {
            if s.state.is_in_flight() {
                return false;
            }
            *s = AnalysisSnapshot::uploading(run_id, &document.file_name, source);
            true
        });
        if !accepted {
            warn!("Rejected upload of '{}': analysis already in flight", document.file_name);
            return Err(AppError::AnalysisInFlight);
        }
        info!(
            "Accepted {} upload '{}' ({} bytes), run {}",
            kind,
            document.file_name,
            document.data.len(),
            run_id
        );

        self.update(run_id, |s| s.state = AnalysisState::Extracting);

        let this = self.clone();
        let handle = tokio::spawn(async move { this.run(run_id, kind, document).await });
        *task = Some(handle.abort_handle());

        Ok(self.snapshot())
    }

    /// Aborts any in-flight run and discards all results.
    pub fn reset(&self) {
        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
        let previous = self.inner.session.send_replace(AnalysisSnapshot::idle());
        info!("Analysis session reset (was {:?})", previous.state);
    }

    /// Records helpful / not-helpful feedback for one recommendation.
    pub fn record_feedback(&self, recommendation_id: &str, helpful: bool) -> Result<(), AppError> {
        let recorded = self.inner.session.send_if_modified(|s| {
            if !s.recommendations.iter().any(|r| r.id == recommendation_id) {
                return false;
            }
            s.feedback.insert(recommendation_id.to_string(), helpful);
            true
        });
        if !recorded {
            return Err(AppError::NotFound(format!(
                "Recommendation {recommendation_id} not found"
            )));
        }
        info!(
            "Feedback for recommendation {}: {}",
            recommendation_id,
            if helpful { "helpful" } else { "not helpful" }
        );
        Ok(())
    }

    /// Applies `f` only if `run_id` is still the current run.
    fn update(&self, run_id: u64, f: impl FnOnce(&mut AnalysisSnapshot)) -> bool {
        self.inner.session.send_if_modified(|s| {
            if s.run_id != run_id {
                return false;
            }
            f(s);
            true
        })
    }

    async fn run(&self, run_id: u64, kind: DocumentKind, document: UploadedDocument) {
        match self.execute(run_id, kind, &document).await {
            Ok((analysis, recommendations)) => {
                let score = analysis.score;
                let written = self.update(run_id, |s| {
                    s.state = AnalysisState::Complete;
                    s.progress = 100;
                    s.analysis = Some(analysis);
                    s.recommendations = recommendations;
                    s.completed_at = Some(Utc::now());
                });
                if written {
                    info!("Run {} complete: score {}", run_id, score);
                }
            }
            Err(AnalysisError::Superseded) => {
                info!("Run {} discarded after reset", run_id);
            }
            Err(e) => {
                error!("Run {} failed: {}", run_id, e);
                self.update(run_id, |s| {
                    s.state = AnalysisState::Error;
                    s.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                    s.completed_at = Some(Utc::now());
                });
            }
        }
    }

    async fn execute(
        &self,
        run_id: u64,
        kind: DocumentKind,
        document: &UploadedDocument,
    ) -> Result<(AnalysisResult, Vec<Recommendation>), AnalysisError> {
        let text = self.inner.extractor.extract(kind, document).await?;

        if !self.update(run_id, |s| s.state = AnalysisState::Analyzing) {
            return Err(AnalysisError::Superseded);
        }
        let deadline = Instant::now() + self.inner.settings.min_analysis_duration;

        let work = async {
            // Both calls must succeed; there is no partial result.
            let outcome = match &self.inner.gateway {
                Some(gateway) => {
                    let analysis = gateway.analyze_resume(&text).await?;
                    let recommendations = gateway.generate_recommendations(&text).await?;
                    (analysis, recommendations)
                }
                None => (mock_analysis(), mock_recommendations()),
            };
            tokio::time::sleep_until(deadline).await;
            Ok::<_, AnalysisError>(outcome)
        };

        tokio::select! {
            result = work => result,
            () = self.heartbeat(run_id) => Err(AnalysisError::Superseded),
        }
    }

    /// Bumps progress every tick up to the ceiling. Returns once the run is no longer current.
    async fn heartbeat(&self, run_id: u64) {
        let settings = &self.inner.settings;
        let mut ticker = tokio::time::interval(settings.progress_tick);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let current = self.update(run_id, |s| {
                s.progress = s
                    .progress
                    .saturating_add(settings.progress_step)
                    .min(settings.progress_ceiling);
            });
            if !current {
                return;
            }
        }
    }
}
