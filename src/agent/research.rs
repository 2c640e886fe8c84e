//! Web research agent.
//!
//! Bounded reasoning loop over the LLM with one lookup tool. Each step
//! asks the model to either call the tool or finish; tool observations
//! are fed back into the conversation. Malformed model output is
//! retried a bounded number of times before the loop gives up.

use std::sync::Arc;

use serde_json::Value;

use crate::core::errors::AgentError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::tools::LookupTool;

const MAX_STEPS: usize = 6;
const MAX_MALFORMED_REPLIES: usize = 3;

/// Where the loop currently is.
enum AgentPhase {
    /// Waiting for the model's next decision.
    Thinking,
    /// Running the lookup tool with the model's query.
    ActingWithTool(String),
    /// The model produced a final answer.
    Concluding(String),
}

/// What the model asked for in one reply.
enum AgentDecision {
    ToolCall(String),
    Final(String),
}

pub struct ResearchAgent {
    llm: Arc<dyn LlmProvider>,
    tool: Arc<dyn LookupTool>,
    max_steps: usize,
}

impl ResearchAgent {
    pub fn new(llm: Arc<dyn LlmProvider>, tool: Arc<dyn LookupTool>) -> Self {
        Self {
            llm,
            tool,
            max_steps: MAX_STEPS,
        }
    }

    #[allow(dead_code)]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run the reasoning loop and return the research summary.
    pub async fn run(&self, query: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(build_instructions(self.tool.name())),
            ChatMessage::user(query.to_string()),
        ];

        let mut phase = AgentPhase::Thinking;
        let mut steps = 0;
        let mut malformed = 0;

        loop {
            match phase {
                AgentPhase::Thinking => {
                    if steps >= self.max_steps {
                        return Err(AgentError::Reasoning(format!(
                            "no final answer after {} reasoning steps",
                            self.max_steps
                        )));
                    }
                    steps += 1;
                    tracing::debug!("Research step {}/{}", steps, self.max_steps);

                    let reply = self
                        .llm
                        .chat(ChatRequest::new(messages.clone()))
                        .await?;

                    phase = match parse_agent_decision(&reply) {
                        Some(AgentDecision::ToolCall(tool_query)) => {
                            AgentPhase::ActingWithTool(tool_query)
                        }
                        Some(AgentDecision::Final(answer)) => AgentPhase::Concluding(answer),
                        None => {
                            malformed += 1;
                            if malformed >= MAX_MALFORMED_REPLIES {
                                return Err(AgentError::Reasoning(format!(
                                    "model produced {} malformed replies",
                                    malformed
                                )));
                            }
                            tracing::warn!("Discarding malformed agent reply");
                            messages.push(ChatMessage::system(
                                "Your last reply was not valid JSON. Answer again using \
                                 exactly one of the two JSON formats described above.",
                            ));
                            AgentPhase::Thinking
                        }
                    };
                }
                AgentPhase::ActingWithTool(tool_query) => {
                    let observation = match self.tool.lookup(&tool_query).await {
                        Ok(text) => format!("Tool `{}` result:\n{}", self.tool.name(), text),
                        Err(err) => {
                            tracing::warn!("Lookup tool failed: {}", err);
                            format!("Tool `{}` failed: {}", self.tool.name(), err)
                        }
                    };
                    messages.push(ChatMessage::system(observation));
                    phase = AgentPhase::Thinking;
                }
                AgentPhase::Concluding(answer) => {
                    if answer.trim().is_empty() {
                        return Err(AgentError::Reasoning(
                            "model concluded with an empty answer".to_string(),
                        ));
                    }
                    return Ok(answer);
                }
            }
        }
    }
}

fn build_instructions(tool_name: &str) -> String {
    format!(
        r#"You are a travel research assistant. Gather the facts needed to answer the user's travel question.
You have access to one tool: `{tool_name}`, an encyclopedia search.
When you need to look something up, respond ONLY with JSON in this format:
{{"type":"tool_call","tool_name":"{tool_name}","tool_args":{{"query":"<search terms>"}}}}
When you have enough information, respond ONLY with JSON in this format:
{{"type":"final","content":"<research summary in the language of the question>"}}
Do not include any extra text outside the JSON."#
    )
}

fn parse_agent_decision(text: &str) -> Option<AgentDecision> {
    let value = parse_json_from_text(text)?;

    let action_type = value
        .get("type")
        .or_else(|| value.get("action"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    if action_type == "tool_call" {
        let query = value
            .get("tool_args")
            .or_else(|| value.get("args"))
            .and_then(|args| args.get("query"))
            .and_then(|v| v.as_str())?;
        return Some(AgentDecision::ToolCall(query.to_string()));
    }

    if action_type == "final" {
        let content = value
            .get("content")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())?
            .to_string();
        return Some(AgentDecision::Final(content));
    }

    None
}

fn parse_json_from_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    // models often wrap the JSON in prose or code fences
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}
