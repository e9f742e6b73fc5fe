pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.analysis.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resume/analysis",
            post(handlers::handle_submit)
                .get(handlers::handle_get_analysis)
                .delete(handlers::handle_reset),
        )
        .route(
            "/api/v1/resume/analysis/recommendations/:id/feedback",
            post(handlers::handle_feedback),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
