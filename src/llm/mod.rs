//! LLM provider abstraction.
//!
//! This module provides:
//! - `LlmProvider`: trait over chat completion and embedding backends
//! - `GeminiProvider`: Google Generative Language API implementation

pub mod gemini;
pub mod provider;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};
