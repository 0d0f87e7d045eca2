mod config;
mod errors;
mod llm_client;
mod models;
mod report;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, ModelGateway};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. Without a key the service still starts so the
    // health endpoints answer, but uploads are rejected.
    let gateway: Option<Arc<dyn ModelGateway>> = match config.openai_api_key.clone() {
        Some(api_key) => {
            let llm = LlmClient::new(
                api_key,
                config.openai_base_url.clone(),
                config.llm_model.clone(),
            )?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(llm))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; resume processing is disabled");
            None
        }
    };

    match config.max_concurrent_files {
        Some(limit) => info!("Per-request concurrency limited to {limit} files"),
        None => info!("Per-request concurrency unbounded"),
    }

    let cors = cors_layer(&config.cors_allowed_origins);
    let state = AppState {
        gateway,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
