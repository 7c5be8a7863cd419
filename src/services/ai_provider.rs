//! LLM provider client.
//!
//! Every generation in the service goes through [`CompletionProvider`]; the
//! production implementation talks to an OpenAI-compatible
//! `/chat/completions` + `/embeddings` API over reqwest. Transient failures
//! (connect errors, timeouts, 429, 5xx) are retried with capped exponential
//! backoff. Nothing above this layer retries.

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::error::ProviderError;

/// One chat-completion call: a system instruction, a user prompt and a sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging and health output
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based), with up to 50% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exp.min(self.max_delay);
        let jitter_ms = (capped.as_millis() / 2) as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        capped + Duration::from_millis(jitter)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: String,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
        })
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, ProviderError>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.post_once(path, body).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    log::warn!(
                        "Provider call to {} failed ({}), retrying in {:?} (attempt {}/{})",
                        path,
                        err,
                        delay,
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once<T, R>(&self, path: &str, body: &T) -> Result<R, ProviderError>
    where
        T: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
        };

        let response: ChatCompletionResponse = self.post_json("chat/completions", &body).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".to_string()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| self.model.clone()),
            finish_reason: choice.finish_reason,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self.post_json("embeddings", &body).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::MalformedResponse("No embedding in response".to_string()))
    }
}
