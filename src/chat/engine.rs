//! Reasoning engine client.
//!
//! The chat front-end does no language understanding of its own. Each user
//! message, together with the bounded history and the tool catalog, is sent
//! to a model behind an Ollama-compatible chat endpoint; the model answers
//! either with text or with tool invocations to run first.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::EngineError;

// ============================================================================
// Conversation Types
// ============================================================================

/// One turn of the conversation as the model sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Instructions prepended to every request.
    System(String),
    /// What the user typed, possibly annotated with resolved dates.
    User(String),
    /// A model reply, with any tool invocations it requested.
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    /// Output of one tool invocation, fed back to the model.
    ToolResult { name: String, content: String },
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    /// Arguments as a JSON object, passed through to the tool verbatim.
    pub arguments: Value,
}

/// A callable tool advertised to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments.
    pub parameters: Value,
}

/// What the model produced for one request.
#[derive(Debug, Clone)]
pub struct EngineReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl EngineReply {
    /// True when the model wants tool output before it can answer.
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ============================================================================
// Engine Trait
// ============================================================================

/// A chat-completion backend that can request tool invocations.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn chat(&self, turns: &[Turn], tools: &[ToolSpec])
        -> Result<EngineReply, EngineError>;
}

// ============================================================================
// Ollama Engine
// ============================================================================

/// Client for an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEngine {
    pub fn new(config: &LlmConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningEngine for OllamaEngine {
    async fn chat(
        &self,
        turns: &[Turn],
        tools: &[ToolSpec],
    ) -> Result<EngineReply, EngineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: turns.iter().map(to_wire).collect(),
            tools: tools.iter().map(tool_to_wire).collect(),
            stream: false,
        };

        debug!(
            "Sending {} turns and {} tools to {} ({})",
            turns.len(),
            tools.len(),
            self.base_url,
            self.model
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status { status, body });
        }

        let body = response.text().await?;
        let reply: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| EngineError::MalformedReply(e.to_string()))?;

        Ok(reply_from(reply.message))
    }
}

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireToolFunction,
}

#[derive(Debug, Serialize)]
struct WireToolFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    function: WireCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireCallFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: WireMessage,
}

fn to_wire(turn: &Turn) -> WireMessage {
    match turn {
        Turn::System(content) => WireMessage {
            role: "system".to_string(),
            content: content.clone(),
            tool_calls: Vec::new(),
            tool_name: None,
        },
        Turn::User(content) => WireMessage {
            role: "user".to_string(),
            content: content.clone(),
            tool_calls: Vec::new(),
            tool_name: None,
        },
        Turn::Assistant {
            content,
            tool_calls,
        } => WireMessage {
            role: "assistant".to_string(),
            content: content.clone(),
            tool_calls: tool_calls
                .iter()
                .map(|call| WireToolCall {
                    function: WireCallFunction {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_name: None,
        },
        Turn::ToolResult { name, content } => WireMessage {
            role: "tool".to_string(),
            content: content.clone(),
            tool_calls: Vec::new(),
            tool_name: Some(name.clone()),
        },
    }
}

fn tool_to_wire(tool: &ToolSpec) -> WireTool {
    WireTool {
        kind: "function".to_string(),
        function: WireToolFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

fn reply_from(message: WireMessage) -> EngineReply {
    EngineReply {
        content: message.content,
        tool_calls: message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_engine_builds_from_config() {
        let config = LlmConfig {
            base_url: "http://10.0.0.5:11434/".to_string(),
            ..Default::default()
        };

        let engine = OllamaEngine::new(&config).unwrap();
        assert_eq!(engine.model(), "qwen3:8b");
    }

    #[test]
    fn test_request_includes_tool_catalog() {
        let request = ChatRequest {
            model: "llama3.1".to_string(),
            messages: vec![to_wire(&Turn::System("be brief".to_string()))],
            tools: vec![tool_to_wire(&ToolSpec {
                name: "is_free_at".to_string(),
                description: "Check availability".to_string(),
                parameters: json!({"type": "object"}),
            })],
            stream: false,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "is_free_at");
    }

    #[test]
    fn test_request_omits_empty_tool_list() {
        let request = ChatRequest {
            model: "llama3.1".to_string(),
            messages: vec![to_wire(&Turn::User("hi".to_string()))],
            tools: Vec::new(),
            stream: false,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_result_turn_uses_tool_role() {
        let wire = to_wire(&Turn::ToolResult {
            name: "list_events_for_day".to_string(),
            content: "No events found on 2025-06-12.".to_string(),
        });

        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_name"], "list_events_for_day");
    }

    #[test]
    fn test_parse_reply_with_tool_calls() {
        // Shape as Ollama returns it, including fields we ignore.
        let body = r#"{
            "model": "llama3.1",
            "created_at": "2025-06-11T09:00:00Z",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": "list_events_for_day",
                        "arguments": {"date": "2025-06-12"}
                    }
                }]
            },
            "done": true
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from(response.message);

        assert!(reply.wants_tools());
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "list_events_for_day");
        assert_eq!(reply.tool_calls[0].arguments["date"], "2025-06-12");
    }

    #[test]
    fn test_parse_final_reply_without_tool_calls() {
        let body = r#"{
            "model": "llama3.1",
            "message": {
                "role": "assistant",
                "content": "You are free at 10:00."
            },
            "done": true
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from(response.message);

        assert!(!reply.wants_tools());
        assert_eq!(reply.content, "You are free at 10:00.");
    }
}
