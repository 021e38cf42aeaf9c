//! Error types and handling for chainchat core

use thiserror::Error;

/// Result type alias for chainchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chainchat core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool dispatch errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {message}")]
    Api { message: String },
}

/// Tool dispatch errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
