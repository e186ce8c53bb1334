//! Conversational front-end.
//!
//! A terminal REPL that delegates reasoning to a model behind an
//! Ollama-compatible endpoint and hands calendar work to the MCP tool
//! server, which it runs as its own child process. The model decides
//! which tools to call; this module only moves messages around.

mod engine;
mod history;
mod provider;
mod repl;
mod when;

pub use engine::{EngineReply, OllamaEngine, ReasoningEngine, ToolCall, ToolSpec, Turn};
pub use history::{ConversationHistory, MAX_TURNS};
pub use provider::{McpToolProvider, ToolProvider};
pub use repl::ChatSession;
pub use when::{date_hints, DateHint};
