//! In-memory vector index.
//!
//! Read-only after construction. Nearest-neighbour lookup uses cosine
//! similarity; the default result count is a tunable constant.

use super::chunker::Chunk;

/// Default number of chunks returned per retrieval.
pub const DEFAULT_TOP_K: usize = 4;

/// A chunk together with its similarity to the query.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f64,
}

/// Collection of (chunk, embedding) pairs supporting similarity search.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Assemble the index. `chunks` and `embeddings` must be parallel.
    pub fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Self {
        debug_assert_eq!(chunks.len(), embeddings.len());
        Self {
            entries: chunks.into_iter().zip(embeddings).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `limit` chunks most similar to the query embedding,
    /// most relevant first.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<RetrievedChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| RetrievedChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
