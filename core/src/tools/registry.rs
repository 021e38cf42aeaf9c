//! Closed tool set and dispatch

use crate::error::{Result, ToolError};
use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::tools::builtin::{CryptoInfoTool, SendEmailTool};
use crate::tools::{Tool, ToolCall, ToolResult};

/// The fixed set of tools this assistant exposes to the model.
///
/// The set is closed: a name outside it is rejected at lookup time instead
/// of falling through an open name-to-function mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GetCryptoInfo,
    SendEmail,
}

impl ToolKind {
    /// Every tool in the set, in the order schemas are sent to the model
    pub const ALL: [ToolKind; 2] = [ToolKind::GetCryptoInfo, ToolKind::SendEmail];

    /// The name the model uses to request this tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::GetCryptoInfo => "get_crypto_info",
            ToolKind::SendEmail => "send_email",
        }
    }

    /// Resolve a model-supplied name against the fixed set
    pub fn from_name(name: &str) -> Option<Self> {
        ToolKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// Registry holding the tool instances behind the closed [`ToolKind`] set
pub struct ToolRegistry {
    crypto: CryptoInfoTool,
    email: SendEmailTool,
}

impl ToolRegistry {
    /// Create a registry over the two tool instances
    pub fn new(crypto: CryptoInfoTool, email: SendEmailTool) -> Self {
        Self { crypto, email }
    }

    fn tool(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::GetCryptoInfo => &self.crypto,
            ToolKind::SendEmail => &self.email,
        }
    }

    /// Look up a tool by the name the model supplied
    pub fn lookup(&self, name: &str) -> Result<&dyn Tool> {
        ToolKind::from_name(name)
            .map(|kind| self.tool(kind))
            .ok_or_else(|| {
                ToolError::UnknownTool {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Static tool definitions attached to every first-phase model request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL
            .iter()
            .map(|kind| {
                let tool = self.tool(*kind);
                ToolDefinition {
                    tool_type: "function".to_string(),
                    function: FunctionDefinition {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        parameters: tool.parameters_schema(),
                    },
                }
            })
            .collect()
    }

    /// Execute one model-requested call.
    ///
    /// An unknown name fails closed as an error payload so the conversation
    /// loop keeps going.
    pub async fn dispatch(&self, call: ToolCall) -> ToolResult {
        match self.lookup(&call.name) {
            Ok(tool) => {
                tracing::debug!(tool = %call.name, id = %call.id, "dispatching tool call");
                tool.execute(call).await
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, "model requested a tool outside the fixed set");
                ToolResult::error(call.id, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(
            CryptoInfoTool::new(),
            SendEmailTool::new(MailConfig::default()),
        )
    }

    #[test]
    fn tool_set_is_exactly_the_fixed_pair() {
        let names: Vec<&str> = ToolKind::ALL.iter().map(|kind| kind.name()).collect();
        assert_eq!(names, vec!["get_crypto_info", "send_email"]);
    }

    #[test]
    fn from_name_rejects_names_outside_the_set() {
        assert_eq!(
            ToolKind::from_name("get_crypto_info"),
            Some(ToolKind::GetCryptoInfo)
        );
        assert_eq!(ToolKind::from_name("send_email"), Some(ToolKind::SendEmail));
        assert_eq!(ToolKind::from_name("run_shell"), None);
        assert_eq!(ToolKind::from_name(""), None);
    }

    #[test]
    fn lookup_fails_for_unknown_tool() {
        let registry = registry();
        assert!(registry.lookup("get_crypto_info").is_ok());
        assert!(registry.lookup("delete_files").is_err());
    }

    #[test]
    fn definitions_cover_every_tool_with_object_schemas() {
        let definitions = registry().definitions();

        assert_eq!(definitions.len(), ToolKind::ALL.len());
        for definition in &definitions {
            assert_eq!(definition.tool_type, "function");
            assert!(!definition.function.description.is_empty());

            let schema = &definition.function.parameters;
            assert_eq!(schema.get("type").and_then(|v| v.as_str()), Some("object"));
            assert!(schema.get("properties").is_some_and(|p| p.is_object()));
            assert!(schema.get("required").is_some_and(|r| r.is_array()));
        }
    }

    #[tokio::test]
    async fn dispatch_of_unknown_tool_yields_error_payload() {
        let registry = registry();
        let call = ToolCall {
            id: "call_9".to_string(),
            name: "run_shell".to_string(),
            parameters: json!({}),
        };

        let result = registry.dispatch(call).await;

        assert!(!result.success);
        assert_eq!(result.tool_call_id, "call_9");
        let message = result.payload["error"].as_str().unwrap();
        assert!(message.contains("Unknown tool"), "got: {message}");
    }
}
