use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Crate-wide error type.
///
/// Every variant that escapes a request handler is rendered as the uniform
/// assistant-shaped error payload, so clients never see a bare transport
/// error.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("source fetch failed: {0}")]
    Fetch(String),
    #[error("agent reasoning failed: {0}")]
    Reasoning(String),
    #[error("upstream service error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn upstream<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Upstream(err.to_string())
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Internal(err.to_string())
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({
            "content": format!("Erro: {}", self),
            "role": "assistant",
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
