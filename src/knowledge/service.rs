//! Knowledge base lifecycle and retrieval.
//!
//! The vector index is expensive to build (network fetches plus bulk
//! embedding), so it is built lazily on first use and kept for the rest
//! of the process. Concurrent first callers share a single in-flight
//! build; a failed build is not cached and the next caller retries.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::core::errors::AgentError;
use crate::llm::LlmProvider;

use super::chunker::{self, ChunkConfig};
use super::index::{RetrievedChunk, VectorIndex, DEFAULT_TOP_K};
use super::loader::{self, SourceDocument};

/// Probe text sent before bulk embedding to fail fast on bad credentials.
const EMBED_CANARY: &str = "Teste de embedding";

/// Stand-in document when every source fails to load.
const FALLBACK_DOCUMENT_TEXT: &str = "Texto de exemplo sobre turismo no Brasil.";
const FALLBACK_DOCUMENT_ORIGIN: &str = "fallback";

pub struct KnowledgeService {
    llm: Arc<dyn LlmProvider>,
    sources: Vec<String>,
    chunking: ChunkConfig,
    index: OnceCell<Arc<VectorIndex>>,
}

impl KnowledgeService {
    pub fn new(llm: Arc<dyn LlmProvider>, sources: Vec<String>) -> Self {
        Self {
            llm,
            sources,
            chunking: ChunkConfig::default(),
            index: OnceCell::new(),
        }
    }

    /// Get the process-wide vector index, building it on first use.
    pub async fn index(&self) -> Result<Arc<VectorIndex>, AgentError> {
        self.index
            .get_or_try_init(|| self.build())
            .await
            .map(Arc::clone)
    }

    /// Return the chunks most relevant to the query, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>, AgentError> {
        let index = self.index().await?;

        let embeddings = self.llm.embed(&[query.to_string()]).await?;
        let query_embedding = embeddings.first().ok_or_else(|| {
            AgentError::Upstream("embedding service returned no vector for the query".to_string())
        })?;

        Ok(index.search(query_embedding, DEFAULT_TOP_K))
    }

    async fn build(&self) -> Result<Arc<VectorIndex>, AgentError> {
        tracing::info!("Building knowledge base from {} sources", self.sources.len());

        let mut documents = loader::fetch_sources(&self.sources).await;
        if documents.is_empty() {
            tracing::warn!("No source documents loaded, using fallback document");
            documents.push(SourceDocument {
                origin: FALLBACK_DOCUMENT_ORIGIN.to_string(),
                text: FALLBACK_DOCUMENT_TEXT.to_string(),
            });
        }

        let chunks = chunker::split_documents(&documents, &self.chunking);
        if chunks.is_empty() {
            return Err(AgentError::Config(
                "no chunks produced from source documents".to_string(),
            ));
        }
        tracing::info!("Split {} documents into {} chunks", documents.len(), chunks.len());

        // one probe call before committing to the full batch
        self.llm
            .embed(&[EMBED_CANARY.to_string()])
            .await
            .map_err(|err| AgentError::Config(format!("embedding canary failed: {err}")))?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.llm.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(AgentError::Upstream(format!(
                "embedding service returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let index = VectorIndex::new(chunks, embeddings);
        tracing::info!("Knowledge base ready with {} entries", index.len());
        Ok(Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::llm::mock::MockProvider;

    fn service_without_sources(llm: Arc<MockProvider>) -> KnowledgeService {
        // an empty source list loads zero documents without touching the
        // network, which exercises the fallback path
        KnowledgeService::new(llm, Vec::new())
    }

    #[tokio::test]
    async fn test_fallback_document_when_all_sources_fail() {
        let llm = Arc::new(MockProvider::new());
        let service = service_without_sources(llm.clone());

        let index = service.index().await.unwrap();

        assert!(!index.is_empty());
        let results = index.search(&[1.0; 8], 4);
        assert!(results[0].chunk.text.contains("turismo no Brasil"));
    }

    #[tokio::test]
    async fn test_build_runs_once_for_concurrent_callers() {
        let llm = Arc::new(MockProvider::new());
        let service = Arc::new(service_without_sources(llm.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move { service.index().await }));
        }

        let mut indexes = Vec::new();
        for handle in handles {
            indexes.push(handle.await.unwrap().unwrap());
        }

        // one canary call plus one bulk call
        assert_eq!(llm.embed_calls.load(Ordering::SeqCst), 2);
        for index in &indexes[1..] {
            assert!(Arc::ptr_eq(&indexes[0], index));
        }
    }

    #[tokio::test]
    async fn test_canary_failure_is_not_memoized() {
        let llm = Arc::new(MockProvider::new());
        let service = service_without_sources(llm.clone());

        llm.fail_next_embeds(1);
        let err = service.index().await.unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));

        // the next call retries the whole build and succeeds
        let index = service.index().await.unwrap();
        assert!(!index.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_returns_ranked_chunks() {
        let llm = Arc::new(MockProvider::new());
        let service = service_without_sources(llm.clone());

        let results = service.retrieve("praias do Brasil").await.unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= DEFAULT_TOP_K);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_retrieve_propagates_build_failure() {
        let llm = Arc::new(MockProvider::new());
        let service = service_without_sources(llm.clone());

        llm.fail_next_embeds(1);
        let err = service.retrieve("qualquer coisa").await.unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
