//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{Tool, ToolCall, ToolResult};
pub use registry::{ToolKind, ToolRegistry};
