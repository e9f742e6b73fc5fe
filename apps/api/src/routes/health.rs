use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and analysis mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let mode = if state.analysis.uses_fallback() {
        "fallback"
    } else {
        "gateway"
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "analysis_mode": mode
    }))
}
