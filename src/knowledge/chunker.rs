//! Deterministic text chunking.
//!
//! Splits source documents into bounded, overlapping chunks, preferring
//! natural boundaries (paragraph, then sentence, then word) over hard
//! character cuts. Re-splitting the same text always yields the same
//! chunks.

use super::loader::SourceDocument;

/// Chunking parameters.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub max_characters: usize,
    /// Overlap with the previous chunk in characters
    pub overlap_characters: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_characters: 1000,
            overlap_characters: 200,
        }
    }
}

/// A bounded slice of a source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub origin: String,
    pub chunk_index: usize,
}

/// Split every document into chunks, tagging each with its origin.
pub fn split_documents(documents: &[SourceDocument], config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for document in documents {
        for (chunk_index, text) in split_text(&document.text, config).into_iter().enumerate() {
            chunks.push(Chunk {
                text,
                origin: document.origin.clone(),
                chunk_index,
            });
        }
    }
    chunks
}

/// Split text into overlapping pieces of at most `max_characters` chars.
pub fn split_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let max = config.max_characters.max(1);
    let overlap = config.overlap_characters.min(max.saturating_sub(1));

    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + max).min(chars.len());
        let cut = if end < chars.len() {
            start + find_split_point(&chars[start..end])
        } else {
            end
        };

        let piece: String = chars[start..cut].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }

        if cut >= chars.len() {
            break;
        }
        start = cut.saturating_sub(overlap).max(start + 1);
    }

    pieces
}

/// Find the best cut point inside a full window.
///
/// Only the last 20% of the window is searched, so every chunk keeps at
/// least 80% of the maximum size. Preference order: paragraph break,
/// sentence ending, whitespace, then a hard cut at the window end.
fn find_split_point(window: &[char]) -> usize {
    let search_start = (window.len() * 4) / 5;

    // paragraph break
    for pos in (search_start..window.len().saturating_sub(1)).rev() {
        if window[pos] == '\n' && window[pos + 1] == '\n' {
            return pos + 2;
        }
    }

    // sentence ending followed by whitespace
    for pos in (search_start..window.len().saturating_sub(1)).rev() {
        if matches!(window[pos], '.' | '!' | '?') && window[pos + 1].is_whitespace() {
            return pos + 2;
        }
    }

    // word boundary
    for pos in (search_start..window.len()).rev() {
        if window[pos].is_whitespace() {
            return pos + 1;
        }
    }

    window.len()
}
