//! Chat message structures

use serde::{Deserialize, Serialize};

/// Represents a message in the model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: MessageContent,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,

    /// User message (human input)
    User,

    /// Assistant message (model response)
    Assistant,

    /// Tool message (tool execution result)
    Tool,
}

/// Content of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),

    /// Structured content carrying tool requests or results
    Blocks(Vec<ContentBlock>),
}

/// A block of content within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text { text: String },

    /// A tool invocation requested by the model
    ToolUse {
        /// Correlation token, unique within one assistant turn
        id: String,
        /// Name of the tool to invoke
        name: String,
        /// Argument mapping for the tool
        input: serde_json::Value,
    },

    /// The outcome of a tool invocation, echoed back to the model
    ToolResult {
        /// Id of the ToolUse this answers
        tool_call_id: String,
        /// Name of the tool that produced the result
        tool_name: String,
        /// Whether the tool reported a failure
        is_error: bool,
        /// JSON-encoded tool payload
        content: String,
    },
}

impl LlmMessage {
    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a tool-role message answering one tool call
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: MessageRole::Tool,
            content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_call_id: tool_call_id.into(),
                tool_name: tool_name.into(),
                is_error,
                content: content.into(),
            }]),
        }
    }

    /// Get the text content of the message
    pub fn text(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
        }
    }

    /// Check if the message carries tool-call requests
    pub fn has_tool_use(&self) -> bool {
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .any(|block| matches!(block, ContentBlock::ToolUse { .. })),
        }
    }

    /// Tool-call requests in the order the model emitted them
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
                .collect(),
        }
    }

    /// Identifiers of the tool-call requests, in emission order
    pub fn tool_use_ids(&self) -> Vec<&str> {
        self.tool_uses()
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_message_carries_id_and_name() {
        let message = LlmMessage::tool_result("call_1", "get_crypto_info", "{}", false);

        assert_eq!(message.role, MessageRole::Tool);
        let MessageContent::Blocks(blocks) = &message.content else {
            panic!("expected block content");
        };
        assert!(matches!(
            &blocks[0],
            ContentBlock::ToolResult { tool_call_id, tool_name, .. }
                if tool_call_id == "call_1" && tool_name == "get_crypto_info"
        ));
    }

    #[test]
    fn tool_use_ids_preserve_emission_order() {
        let message = LlmMessage {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(vec![
                ContentBlock::ToolUse {
                    id: "call_b".to_string(),
                    name: "get_crypto_info".to_string(),
                    input: json!({"coin_id": "bitcoin"}),
                },
                ContentBlock::Text {
                    text: "checking".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "call_a".to_string(),
                    name: "send_email".to_string(),
                    input: json!({}),
                },
            ]),
        };

        assert!(message.has_tool_use());
        assert_eq!(message.tool_use_ids(), vec!["call_b", "call_a"]);
    }

    #[test]
    fn text_joins_text_blocks_only() {
        let message = LlmMessage {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(vec![
                ContentBlock::Text {
                    text: "one".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "get_crypto_info".to_string(),
                    input: json!({}),
                },
                ContentBlock::Text {
                    text: "two".to_string(),
                },
            ]),
        };

        assert_eq!(message.text().as_deref(), Some("one\ntwo"));
    }
}
