//! Web source loading.
//!
//! Fetches raw pages from the configured URLs and reduces them to plain
//! text. A source that cannot be fetched is skipped, never fatal.

use std::time::Duration;

use crate::core::errors::AgentError;

const FETCH_TIMEOUT_SECS: u64 = 30;

/// Raw text fetched from one configured web location.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub origin: String,
    pub text: String,
}

/// Fetch every configured source, skipping the ones that fail.
pub async fn fetch_sources(urls: &[String]) -> Vec<SourceDocument> {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("Failed to build HTTP client for source loading: {}", err);
            return Vec::new();
        }
    };

    let mut documents = Vec::new();
    for url in urls {
        match fetch_one(&client, url).await {
            Ok(document) => {
                tracing::info!(
                    "Loaded {} characters from {}",
                    document.text.chars().count(),
                    url
                );
                documents.push(document);
            }
            Err(err) => {
                tracing::warn!("Failed to load source {}: {}", url, err);
            }
        }
    }

    documents
}

async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<SourceDocument, AgentError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| AgentError::Fetch(err.to_string()))?;

    if !response.status().is_success() {
        return Err(AgentError::Fetch(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    let html = response
        .text()
        .await
        .map_err(|err| AgentError::Fetch(err.to_string()))?;

    let text = strip_html_tags(&html);
    if text.trim().is_empty() {
        return Err(AgentError::Fetch(format!("{} produced no text content", url)));
    }

    Ok(SourceDocument {
        origin: url.to_string(),
        text,
    })
}

/// Simple HTML tag stripper. Script and style bodies are dropped entirely.
pub fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut i = 0;

    while let Some(rel) = html[i..].find('<') {
        let open = i + rel;
        out.push_str(&html[i..open]);

        if has_ci_prefix(&html[open..], "<script") {
            i = match find_ci(&html[open..], "</script>") {
                Some(pos) => open + pos + "</script>".len(),
                None => html.len(),
            };
        } else if has_ci_prefix(&html[open..], "<style") {
            i = match find_ci(&html[open..], "</style>") {
                Some(pos) => open + pos + "</style>".len(),
                None => html.len(),
            };
        } else {
            i = match html[open..].find('>') {
                Some(pos) => open + pos + 1,
                None => html.len(),
            };
            // tags often separate words
            out.push(' ');
        }
    }
    out.push_str(&html[i..]);

    let lines: Vec<String> = out
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect();

    lines.join("\n")
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive ASCII prefix check, byte-safe for mixed content.
fn has_ci_prefix(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Case-insensitive ASCII substring search, returns a byte offset.
fn find_ci(text: &str, needle: &str) -> Option<usize> {
    let haystack = text.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&pos| haystack[pos..pos + needle.len()].eq_ignore_ascii_case(needle))
}
