use crate::domain::entities::{ChatMessage, ToolDefinition};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// A text-generation service that answers a transcript with either final text
/// or a request to call some of the offered tools.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> DomainResult<ChatMessage>;
}
