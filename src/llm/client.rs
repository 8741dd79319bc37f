//! HTTP client for an Ollama-compatible `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::retry::{MAX_RETRIES, Sleeper, TokioSleeper, retry_with_backoff};
use crate::commit::build_prompt;
use crate::error::GenerateError;
use crate::git::GitState;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "gpt-oss:120b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Applied to each attempt separately.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default endpoint, model and timeout with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Outcome of a single failed attempt.
#[derive(Debug)]
enum AttemptError {
    RateLimited { body: String },
    Fatal(GenerateError),
}

/// Anything that can turn a prompt into model text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitMessageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Client that posts prompts and retries on rate limiting.
pub struct GenerationClient {
    http: Client,
    config: ClientConfig,
    sleeper: Box<dyn Sleeper>,
}

impl GenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self, GenerateError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenerateError::ClientBuild)?;

        Ok(Self {
            http,
            config,
            sleeper: Box::new(TokioSleeper),
        })
    }

    /// Replace the delay primitive used between retries.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send the prompt and return the trimmed model output.
    ///
    /// Only HTTP 429 is retried, at most `MAX_RETRIES` times. Every other
    /// failure ends the call on the attempt that produced it.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let result = retry_with_backoff(
            || self.attempt(&request),
            |e| matches!(e, AttemptError::RateLimited { .. }),
            self.sleeper.as_ref(),
        )
        .await;

        match result {
            Ok(text) => Ok(text),
            Err(AttemptError::RateLimited { body }) => Err(GenerateError::RateLimitExceeded {
                retries: MAX_RETRIES,
                body,
            }),
            Err(AttemptError::Fatal(e)) => Err(e),
        }
    }

    async fn attempt(&self, request: &GenerateRequest<'_>) -> Result<String, AttemptError> {
        debug!(
            "POST {} (model: {}, prompt: {} bytes)",
            self.config.base_url,
            request.model,
            request.prompt.len()
        );

        let response = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Fatal(GenerateError::Transport(e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::RateLimited { body });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Fatal(GenerateError::RemoteError {
                status,
                body,
            }));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(GenerateError::DecodeError(e)))?;
        debug!("Response received (done: {})", parsed.done);

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(AttemptError::Fatal(GenerateError::EmptyResponse));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CommitMessageGenerator for GenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        GenerationClient::generate(self, prompt).await
    }
}

/// Build the prompt for a staged diff and ask the generator for a message.
pub async fn generate_commit_message<G>(
    generator: &G,
    diff: &str,
    rules: &str,
    state: &GitState,
) -> Result<String, GenerateError>
where
    G: CommitMessageGenerator + ?Sized,
{
    let prompt = build_prompt(diff, rules, state);
    generator.generate(&prompt).await
}
