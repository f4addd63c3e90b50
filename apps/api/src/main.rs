mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::questions::{GenerativeQuestionSource, QuestionSource, StaticQuestionBank};
use crate::screening::store::SessionStore;
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

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    let question_source = build_question_source(&config)?;

    let sessions = SessionStore::new();
    sessions.spawn_idle_sweeper(config.session_idle_ttl, config.session_sweep_interval);

    let state = AppState {
        sessions,
        question_source,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Uses the LLM when a usable API key is configured, the static bank otherwise.
/// A missing key is never a startup failure.
fn build_question_source(config: &Config) -> Result<Arc<dyn QuestionSource>> {
    match config.usable_api_key() {
        Some(key) => {
            let llm = LlmClient::new(
                config.hf_api_url.clone(),
                key.to_string(),
                config.llm_timeout,
            )?;
            info!(
                "LLM question generation enabled ({}, timeout {}s)",
                config.hf_api_url,
                config.llm_timeout.as_secs()
            );
            Ok(Arc::new(GenerativeQuestionSource::new(
                Arc::new(llm),
                config.llm_timeout,
            )))
        }
        None => {
            info!("No HUGGING_FACE_API_KEY configured, using the static question bank");
            Ok(Arc::new(StaticQuestionBank))
        }
    }
}
