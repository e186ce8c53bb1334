//! Error types for the Sundial calendar assistant

use thiserror::Error;

/// Result type alias for Sundial operations
pub type Result<T> = std::result::Result<T, SundialError>;

/// Main error type for Sundial
#[derive(Error, Debug)]
pub enum SundialError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Calendar backend errors
    #[error("Calendar backend error: {0}")]
    Backend(#[from] BackendError),

    /// Reasoning engine errors
    #[error("Reasoning engine error: {0}")]
    Engine(#[from] EngineError),

    /// MCP protocol errors
    #[error("MCP error: {0}")]
    Mcp(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Calendar backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Failed to set up HTTPS transport: {0}")]
    Tls(#[source] std::io::Error),

    #[error("Google Calendar API error: {0}")]
    Api(#[from] google_calendar3::Error),

    #[error("Event has no usable start or end time: {0}")]
    MalformedEvent(String),

    #[error("Event not found: {0}")]
    NotFound(String),
}

/// Reasoning engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to reach model endpoint: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model reply: {0}")]
    MalformedReply(String),
}
