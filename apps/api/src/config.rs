use std::time::Duration;

use anyhow::{ensure, Context, Result};

const DEFAULT_HF_API_URL: &str =
    "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium";

/// Keys this short are treated as placeholders, not credentials.
const MIN_API_KEY_LEN: usize = 11;

/// Application configuration loaded from environment variables.
/// A missing API key is not an error: it only disables question generation via the LLM.
#[derive(Debug, Clone)]
pub struct Config {
    pub hf_api_key: Option<String>,
    pub hf_api_url: String,
    pub llm_timeout: Duration,
    /// Sessions untouched for this long are dropped by the sweeper.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let hf_api_key = std::env::var("HUGGING_FACE_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Config {
            hf_api_key,
            hf_api_url: std::env::var("HF_API_URL")
                .unwrap_or_else(|_| DEFAULT_HF_API_URL.to_string()),
            llm_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            session_idle_ttl: positive_secs(
                "SESSION_IDLE_TTL_SECS",
                &std::env::var("SESSION_IDLE_TTL_SECS").unwrap_or_else(|_| "1800".to_string()),
            )?,
            session_sweep_interval: positive_secs(
                "SESSION_SWEEP_INTERVAL_SECS",
                &std::env::var("SESSION_SWEEP_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the API key only when it looks like a real credential.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.hf_api_key
            .as_deref()
            .filter(|key| key.len() >= MIN_API_KEY_LEN)
    }
}

fn positive_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{name} must be a whole number of seconds"))?;
    ensure!(secs > 0, "{name} must be greater than zero");
    Ok(Duration::from_secs(secs))
}
