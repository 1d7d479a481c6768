use crate::domain::entities::{ChatMessage, ToolDefinition};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::completion_backend::CompletionBackend;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

const ERROR_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    stream: bool,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionsBackend {
    config: ChatCompletionsConfig,
    http_client: Client,
}

impl ChatCompletionsBackend {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> DomainResult<ChatMessage> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            tools,
            stream: false,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!(
                        "Timed out after {} seconds: {}",
                        self.config.timeout.as_secs(),
                        e
                    )
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    format!("Network error: {}", e)
                };
                error!("Completion request failed: {}", message);
                DomainError::BackendUnavailable(message)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::BackendUnavailable(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        parse_completion(&body)
    }
}

/// Map a non-success status to the matching error class.
fn status_error(status: StatusCode, body: &str) -> DomainError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Completion backend rate limited the request");
            DomainError::BackendRateLimited
        }
        StatusCode::PAYMENT_REQUIRED => {
            warn!("Completion backend quota exhausted");
            DomainError::BackendQuotaExhausted
        }
        _ => {
            let excerpt: String = body.chars().take(ERROR_EXCERPT_CHARS).collect();
            error!("Completion backend error: HTTP {}: {}", status.as_u16(), excerpt);
            DomainError::BackendUnavailable(format!("HTTP {}: {}", status.as_u16(), excerpt))
        }
    }
}

/// Extract the first choice's message from a completion response body.
fn parse_completion(body: &str) -> DomainResult<ChatMessage> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        DomainError::BackendProtocolError(format!("Unreadable completion response: {}", e))
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| {
            DomainError::BackendProtocolError("Completion response had no choices".to_string())
        })
}

/// Stand-in used when no API key is configured.
pub struct UnconfiguredBackend;

#[async_trait]
impl CompletionBackend for UnconfiguredBackend {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> DomainResult<ChatMessage> {
        Err(DomainError::BackendUnavailable(
            "ASSISTANT_API_KEY not configured".to_string(),
        ))
    }
}
