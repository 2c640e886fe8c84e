use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::AgentError;
use super::provider::LlmProvider;
use super::types::ChatRequest;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_EMBED_MODEL: &str = "embedding-001";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Google Generative Language API provider.
///
/// The API key is validated by the service on first use, not at
/// construction, so a missing key fails the first request rather than
/// startup.
#[derive(Clone)]
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    chat_model: String,
    embed_model: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            client,
        }
    }

    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Map chat messages onto the Gemini wire format.
    ///
    /// Gemini only knows "user" and "model" turns; system messages are
    /// collected into a single `systemInstruction` block.
    fn build_chat_body(&self, request: &ChatRequest) -> Value {
        let mut system_parts: Vec<String> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for message in &request.messages {
            match message.role.as_str() {
                "system" => system_parts.push(message.content.clone()),
                role => {
                    let gemini_role = if role == "assistant" { "model" } else { "user" };
                    contents.push(json!({
                        "role": gemini_role,
                        "parts": [{"text": message.content}],
                    }));
                }
            }
        }

        let mut body = json!({ "contents": contents });

        if let Some(obj) = body.as_object_mut() {
            if !system_parts.is_empty() {
                obj.insert(
                    "systemInstruction".to_string(),
                    json!({"parts": [{"text": system_parts.join("\n\n")}]}),
                );
            }

            let mut generation_config = serde_json::Map::new();
            if let Some(t) = request.temperature {
                generation_config.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                generation_config.insert("maxOutputTokens".to_string(), json!(t));
            }
            if !generation_config.is_empty() {
                obj.insert("generationConfig".to_string(), Value::Object(generation_config));
            }
        }

        body
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, AgentError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.chat_model, self.api_key
        );

        let body = self.build_chat_body(&request);

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AgentError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AgentError::Upstream(format!(
                "Gemini chat error ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(AgentError::upstream)?;

        extract_candidate_text(&payload).ok_or_else(|| {
            AgentError::Upstream("Gemini chat response contained no candidate text".to_string())
        })
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AgentError> {
        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.base_url, self.embed_model, self.api_key
        );

        let requests: Vec<Value> = inputs
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", self.embed_model),
                    "content": {"parts": [{"text": text}]},
                })
            })
            .collect();

        let res = self
            .client
            .post(&url)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(AgentError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AgentError::Upstream(format!(
                "Gemini embed error ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(AgentError::upstream)?;
        let embeddings = extract_embeddings(&payload);

        if embeddings.len() != inputs.len() {
            return Err(AgentError::Upstream(format!(
                "Gemini returned {} embeddings for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}

fn extract_candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn extract_embeddings(payload: &Value) -> Vec<Vec<f32>> {
    let mut embeddings = Vec::new();
    if let Some(data) = payload.get("embeddings").and_then(|v| v.as_array()) {
        for item in data {
            if let Some(values) = item.get("values").and_then(|v| v.as_array()) {
                let vector: Vec<f32> = values
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect();
                embeddings.push(vector);
            }
        }
    }
    embeddings
}
