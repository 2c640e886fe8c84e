//! Request handlers.
//!
//! `perguntar` is the single query endpoint: research and retrieval run
//! concurrently, their results are synthesized into one answer, and the
//! exchange is appended to the history file. Any failure surfaces as the
//! uniform assistant-shaped error payload.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::agent::synthesizer::synthesize;
use crate::agent::ResearchAgent;
use crate::core::errors::AgentError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub content: String,
    pub role: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn perguntar(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>, AgentError> {
    tracing::info!("Handling travel query ({} chars)", request.query.chars().count());

    let agent = ResearchAgent::new(state.llm.clone(), state.tool.clone());

    let (web_context, documents) = tokio::join!(
        agent.run(&request.query),
        state.knowledge.retrieve(&request.query),
    );
    let web_context = web_context?;
    let documents = documents?;

    let answer = synthesize(state.llm.as_ref(), &request.query, &web_context, &documents).await?;

    // history is only recorded for successful answers
    state.history.append(&request.query, &answer).await?;

    Ok(Json(AnswerResponse {
        content: answer,
        role: "assistant".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;
    use crate::config::AppConfig;
    use crate::history::HistoryStore;
    use crate::knowledge::KnowledgeService;
    use crate::llm::mock::MockProvider;
    use crate::llm::LlmProvider;
    use crate::tools::stub::StaticLookup;
    use crate::tools::LookupTool;

    fn test_state(llm: Arc<MockProvider>, dir: &tempfile::TempDir) -> AppState {
        let config = AppConfig {
            port: 0,
            google_api_key: String::new(),
            history_path: dir.path().join("historico.json"),
            log_dir: dir.path().join("logs"),
            knowledge_sources: Vec::new(),
        };
        let provider: Arc<dyn LlmProvider> = llm.clone();
        let tool: Arc<dyn LookupTool> = Arc::new(StaticLookup::new("Salvador fica na Bahia."));

        AppState {
            config: Arc::new(config),
            llm: provider.clone(),
            tool,
            knowledge: Arc::new(KnowledgeService::new(provider, Vec::new())),
            history: HistoryStore::new(dir.path().join("historico.json")),
        }
    }

    fn query(text: &str) -> Json<QueryRequest> {
        Json(QueryRequest {
            query: text.to_string(),
        })
    }

    #[tokio::test]
    async fn test_perguntar_success() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(MockProvider::new());
        let state = test_state(llm.clone(), &dir);

        llm.push_reply(r#"{"type":"final","content":"Salvador tem carnaval e praias."}"#);
        llm.push_reply("Dia 1: Pelourinho. Dia 2: praia do Porto da Barra. Dia 3: Itaparica.");

        let Json(body) = perguntar(State(state.clone()), query("3 dias em Salvador"))
            .await
            .unwrap();

        assert!(!body.content.is_empty());
        assert_eq!(body.role, "assistant");

        let entries = state.history.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pergunta, "3 dias em Salvador");
        assert_eq!(entries[0].resposta, body.content);
    }

    #[tokio::test]
    async fn test_perguntar_synthesis_failure_writes_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(MockProvider::new());
        let state = test_state(llm.clone(), &dir);

        llm.push_reply(r#"{"type":"final","content":"pesquisa ok"}"#);
        llm.push_error(AgentError::Upstream("generation quota exceeded".to_string()));

        let err = perguntar(State(state.clone()), query("3 dias em Salvador"))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(payload["role"], "assistant");
        let content = payload["content"].as_str().unwrap();
        assert!(content.starts_with("Erro: "));
        assert!(content.contains("generation quota exceeded"));

        assert!(state.history.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_perguntar_research_failure() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(MockProvider::new());
        let state = test_state(llm.clone(), &dir);

        // every research step is malformed, so the loop gives up
        for _ in 0..3 {
            llm.push_reply("rambling non-JSON reply");
        }

        let err = perguntar(State(state.clone()), query("qualquer pergunta"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Reasoning(_)));
        assert!(state.history.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
