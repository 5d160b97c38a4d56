//! HTTP client for OpenAI-compatible chat-completions endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::prompt::{build_messages, ChatMessage};
use super::{InsightConfig, InsightError, InsightGenerator, InsightResult};
use crate::core::AnalysisReport;

const BASE_BACKOFF: Duration = Duration::from_millis(250);

/// HTTP client for an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct InsightClient {
    config: Arc<InsightConfig>,
    client: Client,
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Response body from `/chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl InsightClient {
    /// Create a new client with the given configuration.
    pub fn new(config: InsightConfig) -> InsightResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| InsightError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Sends one chat-completions request without retrying.
    pub async fn complete(&self, messages: &[ChatMessage]) -> InsightResult<String> {
        let url = format!("{}/chat/completions", self.config.endpoint());
        let body = ChatRequest {
            model: self.config.model(),
            messages,
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key().expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Network {
                message: e.to_string(),
            })?;

        let parsed: ChatResponse = self.handle_response(response).await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(InsightError::MalformedResponse {
                message: "response contained no message content".to_string(),
            });
        }
        Ok(content)
    }

    /// Handle a successful or error response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> InsightResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| InsightError::Serialization {
                    message: e.to_string(),
                })
        } else {
            self.handle_error_response(response).await
        }
    }

    /// Convert an error response to an InsightError.
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> InsightResult<T> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(InsightError::Authentication { message: body }),
            429 => Err(InsightError::RateLimited {
                retry_after_secs: retry_after,
            }),
            400 | 422 => Err(InsightError::InvalidRequest { message: body }),
            status => Err(InsightError::ServerError {
                status,
                message: body,
            }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Delay before retrying `error`, or `None` when it should not be retried.
    ///
    /// A server-requested delay longer than the request timeout is not honored.
    fn retry_delay(&self, error: &InsightError, attempt: u32) -> Option<Duration> {
        if !error.is_retryable() || attempt >= self.config.max_retries() {
            return None;
        }
        match error.retry_after().map(Duration::from_secs) {
            Some(delay) if delay > self.config.timeout() => None,
            Some(delay) => Some(delay),
            None => Some(BASE_BACKOFF * 2u32.pow(attempt)),
        }
    }
}

#[async_trait]
impl InsightGenerator for InsightClient {
    #[instrument(skip(self, report), fields(model = %self.config.model()))]
    async fn generate(&self, report: &AnalysisReport) -> InsightResult<String> {
        let messages = build_messages(report);
        let mut attempt = 0;

        loop {
            match self.complete(&messages).await {
                Ok(text) => {
                    debug!(attempt, chars = text.len(), "insight generated");
                    return Ok(text);
                }
                Err(e) => match self.retry_delay(&e, attempt) {
                    Some(delay) => {
                        warn!(attempt, ?delay, "Insight request failed, retrying: {e}");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}
