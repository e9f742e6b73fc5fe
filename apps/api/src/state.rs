use crate::analysis::AnalysisOrchestrator;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single analysis session. Holds the gateway (or none, on the fallback path).
    pub analysis: AnalysisOrchestrator,
}
