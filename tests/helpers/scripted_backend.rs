#![allow(dead_code)]
use async_trait::async_trait;
use findnkeep::domain::entities::{ChatMessage, ToolCall, ToolDefinition};
use findnkeep::domain::errors::{DomainError, DomainResult};
use findnkeep::domain::ports::completion_backend::CompletionBackend;
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Completion backend that replays queued replies and records every request.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<DomainResult<ChatMessage>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<DomainResult<ChatMessage>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> DomainResult<ChatMessage> {
        self.requests.lock().await.push(messages.to_vec());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::BackendUnavailable("script exhausted".into())))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> DomainResult<ChatMessage> {
    Ok(ChatMessage::tool_request(vec![ToolCall::new(
        id,
        name,
        arguments.to_string(),
    )]))
}

pub fn text_reply(content: &str) -> DomainResult<ChatMessage> {
    Ok(ChatMessage::assistant(content))
}

/// The tool result message answering `call_id` in a recorded request.
pub fn tool_result<'a>(request: &'a [ChatMessage], call_id: &str) -> Option<&'a str> {
    request
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some(call_id))
        .and_then(|m| m.content.as_deref())
}
