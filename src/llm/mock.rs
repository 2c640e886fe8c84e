//! Scriptable provider for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::errors::AgentError;
use super::provider::LlmProvider;
use super::types::ChatRequest;

const MOCK_DIMENSIONS: usize = 8;

/// LLM provider that replays scripted chat replies and produces
/// deterministic embeddings derived from the input text.
pub struct MockProvider {
    replies: Mutex<VecDeque<Result<String, AgentError>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub embed_calls: AtomicUsize,
    embed_failures: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            embed_calls: AtomicUsize::new(0),
            embed_failures: AtomicUsize::new(0),
        }
    }

    pub fn push_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn push_error(&self, err: AgentError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    /// Make the next `n` embed calls fail with an upstream error.
    pub fn fail_next_embeds(&self, n: usize) {
        self.embed_failures.store(n, Ordering::SeqCst);
    }

    /// Text of every prompt seen so far, flattened for assertions.
    pub fn prompt_text(&self) -> String {
        self.chat_requests
            .lock()
            .unwrap()
            .iter()
            .flat_map(|request| request.messages.iter())
            .map(|message| message.content.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![1.0f32; MOCK_DIMENSIONS];
        for ch in text.chars() {
            let bucket = (ch as usize) % MOCK_DIMENSIONS;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, AgentError> {
        self.chat_requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Upstream("mock provider: no scripted reply".to_string())))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AgentError> {
        let failures = self.embed_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.embed_failures.store(failures - 1, Ordering::SeqCst);
            return Err(AgentError::Upstream("mock provider: embed failure".to_string()));
        }

        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|text| Self::vectorize(text)).collect())
    }
}
