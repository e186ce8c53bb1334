//! Sundial: Conversational Calendar Assistant
//!
//! An MCP server exposing Google Calendar operations as tools, plus a
//! terminal chat front-end that delegates reasoning to a local model and
//! calls the tools over MCP.

pub mod calendar;
pub mod chat;
pub mod config;
pub mod error;
pub mod mcp;

pub use calendar::{
    parse_day, parse_instant, BackendHandle, CalendarBackend, CalendarEvent, CalendarService,
    DayWindow, EventChange, GoogleCalendar, OpOutcome,
};
pub use chat::{
    ChatSession, ConversationHistory, McpToolProvider, OllamaEngine, ReasoningEngine,
    ToolProvider,
};
pub use config::Config;
pub use error::{Result, SundialError};
pub use mcp::{run_server, SundialServer};
