//! Query/answer history.
//!
//! One JSON file holding an ordered array of entries. Every append
//! re-reads the file, appends in memory and rewrites it in full; writes
//! are serialized behind an async mutex so concurrent requests cannot
//! interleave and corrupt the array.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::errors::AgentError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub pergunta: String,
    pub resposta: String,
}

#[derive(Clone)]
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append one entry, stamping it with the current time.
    pub async fn append(&self, pergunta: &str, resposta: &str) -> Result<(), AgentError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        entries.push(HistoryEntry {
            timestamp: Utc::now().to_rfc3339(),
            pergunta: pergunta.to_string(),
            resposta: resposta.to_string(),
        });

        let payload = serde_json::to_string_pretty(&entries).map_err(AgentError::internal)?;
        tokio::fs::write(&self.path, payload)
            .await
            .map_err(AgentError::internal)?;

        Ok(())
    }

    /// Read every entry, oldest first.
    pub async fn read_all(&self) -> Result<Vec<HistoryEntry>, AgentError> {
        self.load().await
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>, AgentError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AgentError::internal(err)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                // an unreadable file is treated as empty rather than
                // blocking all further writes
                tracing::warn!("History file {} is not valid JSON: {}", self.path.display(), err);
                Ok(Vec::new())
            }
        }
    }
}
