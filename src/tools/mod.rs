//! External lookup tools available to the research agent.

pub mod wikipedia;

use async_trait::async_trait;

use crate::core::errors::AgentError;

/// A tool the research agent may call while reasoning.
#[async_trait]
pub trait LookupTool: Send + Sync {
    /// Tool name as presented to the language model.
    fn name(&self) -> &str;

    /// Run one lookup and return a plain-text observation.
    async fn lookup(&self, query: &str) -> Result<String, AgentError>;
}

#[cfg(test)]
pub mod stub {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Tool that always answers with the same text.
    pub struct StaticLookup {
        pub reply: String,
        pub calls: AtomicUsize,
    }

    impl StaticLookup {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LookupTool for StaticLookup {
        fn name(&self) -> &str {
            "wikipedia"
        }

        async fn lookup(&self, _query: &str) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    /// Tool that always fails.
    pub struct FailingLookup;

    #[async_trait]
    impl LookupTool for FailingLookup {
        fn name(&self) -> &str {
            "wikipedia"
        }

        async fn lookup(&self, _query: &str) -> Result<String, AgentError> {
            Err(AgentError::Upstream("lookup service unavailable".to_string()))
        }
    }
}
