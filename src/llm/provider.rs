use async_trait::async_trait;

use crate::core::errors::AgentError;
use super::types::ChatRequest;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini")
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, AgentError>;

    /// generate embeddings, one vector per input
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AgentError>;
}
