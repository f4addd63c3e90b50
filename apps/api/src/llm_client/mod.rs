/// LLM Client — the single point of entry for all text-generation calls in the screener.
///
/// ARCHITECTURAL RULE: No other module may call the inference API directly.
/// All LLM interactions MUST go through this module.
///
/// Callers never see a failure from here surface to a candidate; the question source
/// turns every `LlmError` into the static fallback bank.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_NEW_TOKENS: u32 = 256;
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;
/// 503 means the hosted model is still loading; a short wait usually fixes it.
const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub generated_text: String,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

/// Anything that turns a prompt into free text. `LlmClient` is the production
/// implementation; tests plug in canned or failing generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Wraps the Hugging Face text-generation inference endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
        })
    }

    /// Makes a raw call to the inference API, returning the cleaned generated text.
    /// Retries once when the model is still loading (503) or rate limited (429).
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                return_full_text: false,
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(1000);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return Err(LlmError::Timeout),
                Err(e) => return Err(LlmError::Http(e)),
            };

            let status = response.status();

            if status.as_u16() == 429 || status.as_u16() == 503 {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<InferenceError>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let text = parse_generated_text(&body)?;

            debug!(
                "LLM call succeeded: prompt_chars={}, output_chars={}",
                prompt.len(),
                text.len()
            );

            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt).await
    }
}

/// Pulls the first `generated_text` out of an inference response body and cleans it.
fn parse_generated_text(body: &str) -> Result<String, LlmError> {
    let results: Vec<GeneratedText> = serde_json::from_str(body)?;
    let text = results
        .into_iter()
        .next()
        .map(|r| clean_response(&r.generated_text))
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text)
}

/// Drops instruction-tag tails and sentence tokens some chat models echo back.
fn clean_response(text: &str) -> String {
    let cut = [text.find("[INST]"), text.find("[/INST]")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());

    text[..cut].replace("<s>", "").replace("</s>", "").trim().to_string()
}
