//! Wikipedia search tool.
//!
//! Queries the Portuguese Wikipedia search API and returns the top
//! matches as a plain-text observation for the agent loop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::errors::AgentError;
use crate::knowledge::loader::strip_html_tags;

use super::LookupTool;

const DEFAULT_API_URL: &str = "https://pt.wikipedia.org/w/api.php";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const RESULT_LIMIT: usize = 3;

pub struct WikipediaTool {
    api_url: String,
    client: Client,
}

impl WikipediaTool {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            api_url: DEFAULT_API_URL.to_string(),
            client,
        }
    }

    #[allow(dead_code)]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupTool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<String, AgentError> {
        let url = format!(
            "{}?action=query&list=search&srsearch={}&srlimit={}&format=json&utf8=1",
            self.api_url,
            urlencoding::encode(query),
            RESULT_LIMIT
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AgentError::upstream)?;

        if !response.status().is_success() {
            return Err(AgentError::Upstream(format!(
                "Wikipedia search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(AgentError::upstream)?;
        Ok(format_search_results(&payload, query))
    }
}

fn format_search_results(payload: &Value, query: &str) -> String {
    let items = payload
        .get("query")
        .and_then(|q| q.get("search"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut entries = Vec::new();
    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let snippet = item.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
        if title.is_empty() {
            continue;
        }
        // snippets carry highlight markup
        entries.push(format!("{}: {}", title, strip_html_tags(snippet)));
    }

    if entries.is_empty() {
        format!("No encyclopedia results found for \"{}\".", query)
    } else {
        entries.join("\n")
    }
}
