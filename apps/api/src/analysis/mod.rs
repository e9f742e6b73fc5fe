// Resume analysis: prompt templates, mock fallback data, the orchestrator
// state machine and its HTTP handlers.
// All Gemini calls go through llm_client — no direct HTTP calls here.

pub mod fallback;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;

pub use orchestrator::{AnalysisOrchestrator, AnalysisSnapshot, AnalysisState, OrchestratorSettings};
