use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_api::analysis::{AnalysisOrchestrator, OrchestratorSettings};
use resume_api::config::Config;
use resume_api::extract::DocumentTextExtractor;
use resume_api::llm_client::{AnalysisGateway, GatewayClient, GatewayConfig};
use resume_api::routes::build_router;
use resume_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "resume_api={level},api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Gateway only when a key is configured; otherwise serve mock data.
    let client = GatewayClient::new(GatewayConfig {
        api_key: config.gemini_api_key.clone(),
        endpoint: config.gemini_api_url.clone(),
        timeout: config.gemini_timeout,
        max_attempts: config.gemini_max_attempts,
    })?;
    let gateway: Option<Arc<dyn AnalysisGateway>> = if client.is_configured() {
        info!("Gemini client initialized ({})", config.gemini_api_url);
        Some(Arc::new(client) as Arc<dyn AnalysisGateway>)
    } else {
        warn!("Gemini API key not configured. Using mock data instead.");
        None
    };

    let analysis = AnalysisOrchestrator::new(
        gateway,
        Arc::new(DocumentTextExtractor),
        OrchestratorSettings::from(&config),
    );

    let state = AppState {
        config: config.clone(),
        analysis,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
