//! Conversation orchestration

pub mod config;
pub mod core;

pub use config::{AgentConfig, DEFAULT_SYSTEM_PROMPT};
pub use core::AgentCore;
