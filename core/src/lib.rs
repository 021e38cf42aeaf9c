//! # chainchat core
//!
//! Core library for chainchat - a conversational crypto assistant.
//!
//! This library provides the conversation orchestrator, the chat-endpoint
//! client abstraction, and the fixed tool set the assistant exposes to the
//! model (price lookup, email sending).

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentConfig, AgentCore};
pub use config::{LlmConfig, MailConfig, ModelParams};
pub use error::{Error, Result};

/// Current version of the chainchat-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
