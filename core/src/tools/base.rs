//! Base tool trait and call/result structures

use crate::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Trait for all tools
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool with the given call.
    ///
    /// Failures are encoded in the returned payload; they never surface as
    /// errors past the tool boundary.
    async fn execute(&self, call: ToolCall) -> ToolResult;
}

/// A call to a tool, as requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation token produced by the model
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Argument mapping to pass to the tool
    pub parameters: serde_json::Value,
}

impl ToolCall {
    /// Create a call with a locally minted id
    pub fn new<S: Into<String>>(name: S, parameters: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parameters,
        }
    }

    /// Get a required parameter value by key
    pub fn get_parameter<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .parameters
            .get(key)
            .ok_or_else(|| ToolError::InvalidParameters {
                message: format!("Missing parameter: {}", key),
            })?;

        serde_json::from_value(value.clone()).map_err(|_| {
            ToolError::InvalidParameters {
                message: format!("Invalid parameter type for: {}", key),
            }
            .into()
        })
    }
}

/// Result of a tool execution.
///
/// Always a JSON-serializable mapping: success payloads carry domain fields,
/// failures carry a single `error` field with a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result payload
    pub payload: serde_json::Value,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_call_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            payload,
        }
    }

    /// Create a failure result carrying an `error` field
    pub fn error(tool_call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            payload: json!({ "error": message.into() }),
        }
    }

    /// JSON-encode the payload for the conversation transcript
    pub fn content(&self) -> String {
        self.payload.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_parameter_reports_missing_key() {
        let call = ToolCall::new("get_crypto_info", json!({}));
        let result: Result<String> = call.get_parameter("coin_id");
        assert!(result.is_err());
    }

    #[test]
    fn get_parameter_reports_wrong_type() {
        let call = ToolCall::new("get_crypto_info", json!({"coin_id": 42}));
        let result: Result<String> = call.get_parameter("coin_id");
        assert!(result.is_err());
    }

    #[test]
    fn error_result_encodes_single_error_field() {
        let result = ToolResult::error("call_1", "Unable to fetch crypto data");

        assert!(!result.success);
        assert_eq!(
            result.payload,
            json!({"error": "Unable to fetch crypto data"})
        );
        assert_eq!(result.content(), r#"{"error":"Unable to fetch crypto data"}"#);
    }
}
