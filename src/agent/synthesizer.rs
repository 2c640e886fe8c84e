//! Final answer synthesis.
//!
//! Merges the research summary and the retrieved chunks with the user's
//! question into one fixed prompt and issues exactly one generation
//! call. No retries, no streaming.

use crate::core::errors::AgentError;
use crate::knowledge::index::RetrievedChunk;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const PROMPT_TEMPLATE: &str = r#"Você é um gerente de viagens inteligente e atencioso. Seu papel é ajudar o usuário a planejar a melhor viagem possível.
Responda com um roteiro completo, incluindo eventos, sugestões e preços reais, se disponíveis.

Considere o seguinte:

- O input do usuário com suas preferências.
- Contexto extraído da web.
- Documentos relevantes sobre turismo, passagens e experiências.

Seja objetivo, amigável e prático.

Contexto online: {web_context}
Documentos relevantes: {documents}"#;

/// Generate the final itinerary from the gathered context.
pub async fn synthesize(
    llm: &dyn LlmProvider,
    query: &str,
    web_context: &str,
    documents: &[RetrievedChunk],
) -> Result<String, AgentError> {
    let prompt = PROMPT_TEMPLATE
        .replace("{web_context}", web_context)
        .replace("{documents}", &render_documents(documents));

    let request = ChatRequest::new(vec![
        ChatMessage::system(prompt),
        ChatMessage::user(query.to_string()),
    ]);

    llm.chat(request).await
}

/// Render retrieved chunks as a numbered text block.
fn render_documents(documents: &[RetrievedChunk]) -> String {
    if documents.is_empty() {
        return "(nenhum documento relevante)".to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, retrieved)| {
            format!(
                "[{}] ({}, relevância: {:.2})\n{}",
                i + 1,
                retrieved.chunk.origin,
                retrieved.score,
                retrieved.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
