//! Client for OpenAI-compatible chat endpoints using the async-openai library

use crate::config::types::DEFAULT_CHAT_BASE_URL;
use crate::config::LlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolChoice, ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

/// Chat client for OpenAI-compatible endpoints
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new client from a resolved configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key configured for the chat endpoint".to_string(),
            }
            .into());
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if config.base_url != DEFAULT_CHAT_BASE_URL {
            openai_config = openai_config.with_api_base(&config.base_url);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    /// Convert conversation messages to the wire format
    fn convert_messages(
        &self,
        messages: Vec<LlmMessage>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                MessageRole::System => {
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: text_of(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: text_of(&message.content).into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    converted.push(convert_assistant(&message.content));
                }
                MessageRole::Tool => {
                    // A tool-role message is one wire message per result block,
                    // keyed by the originating call id.
                    let mut pushed_any = false;
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolResult {
                                tool_call_id,
                                content,
                                ..
                            } = block
                            {
                                converted.push(ChatCompletionRequestMessage::Tool(
                                    ChatCompletionRequestToolMessage {
                                        content: ChatCompletionRequestToolMessageContent::Text(
                                            content.clone(),
                                        ),
                                        tool_call_id: tool_call_id.clone(),
                                    },
                                ));
                                pushed_any = true;
                            }
                        }
                    }
                    if !pushed_any {
                        return Err((LlmError::InvalidRequest {
                            message: "Tool message must contain a tool result".to_string(),
                        })
                        .into());
                    }
                }
            }
        }

        Ok(converted)
    }

    /// Convert tool definitions to the wire format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    /// Convert the wire response to the internal format
    fn convert_response(
        &self,
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> Result<LlmResponse> {
        let choice =
            response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::InvalidRequest {
                    message: "No choices in response".to_string(),
                })?;

        let tool_blocks = choice.message.tool_calls.map(|tool_calls| {
            tool_calls
                .into_iter()
                .map(|tool_call| {
                    let function = tool_call.function;
                    // Arguments arrive as a JSON string; keep the raw text if
                    // it fails to parse so nothing is silently dropped.
                    let input: Value = serde_json::from_str(&function.arguments)
                        .unwrap_or(Value::String(function.arguments));
                    ContentBlock::ToolUse {
                        id: tool_call.id,
                        name: function.name,
                        input,
                    }
                })
                .collect::<Vec<_>>()
        });

        let content = match (choice.message.content, tool_blocks) {
            (Some(text), Some(tool_blocks)) => {
                let mut blocks = vec![ContentBlock::Text { text }];
                blocks.extend(tool_blocks);
                MessageContent::Blocks(blocks)
            }
            (None, Some(tool_blocks)) => MessageContent::Blocks(tool_blocks),
            (Some(text), None) => MessageContent::Text(text),
            (None, None) => MessageContent::Text(String::new()),
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage,
            model: response.model,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages)?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if let Some(tools) = tools {
            tracing::debug!(count = tools.len(), "attaching tool definitions");
            request_builder.tools(self.convert_tools(tools));
        }

        if let Some(opts) = options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
            if let Some(tool_choice) = opts.tool_choice {
                request_builder.tool_choice(match tool_choice {
                    ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
                    ToolChoice::None => ChatCompletionToolChoiceOption::None,
                });
            }
        }

        let request = request_builder
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            })?;

        let response =
            self.client
                .chat()
                .create(request)
                .await
                .map_err(|e| LlmError::Api {
                    message: e.to_string(),
                })?;

        self.convert_response(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Flatten message content to plain text for roles that carry no blocks
fn text_of(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Convert assistant content, splitting tool-call blocks into wire tool_calls
fn convert_assistant(content: &MessageContent) -> ChatCompletionRequestMessage {
    match content {
        MessageContent::Text(text) => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    text.clone(),
                )),
                ..Default::default()
            },
        ),
        MessageContent::Blocks(blocks) => {
            let mut text = String::new();
            let mut tool_calls = Vec::new();

            for block in blocks {
                match block {
                    ContentBlock::Text { text: part } => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(part);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_calls.push(ChatCompletionMessageToolCall {
                            id: id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: name.clone(),
                                arguments: input.to_string(),
                            },
                        });
                    }
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: if text.is_empty() {
                    None
                } else {
                    Some(ChatCompletionRequestAssistantMessageContent::Text(text))
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_rejects_empty_api_key() {
        let config = LlmConfig::new("", "gpt-4o");
        assert!(OpenAiClient::new(&config).is_err());
    }

    #[test]
    fn assistant_tool_calls_survive_conversion() {
        let message = convert_assistant(&MessageContent::Blocks(vec![
            ContentBlock::Text {
                text: "checking".to_string(),
            },
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "get_crypto_info".to_string(),
                input: json!({"coin_id": "bitcoin"}),
            },
        ]));

        let ChatCompletionRequestMessage::Assistant(assistant) = message else {
            panic!("expected assistant message");
        };
        let tool_calls = assistant.tool_calls.expect("tool calls present");
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].id, "call_1");
        assert_eq!(tool_calls[0].function.name, "get_crypto_info");
    }

    #[test]
    fn tool_message_without_result_is_rejected() {
        let config = LlmConfig::new("key", "gpt-4o");
        let client = OpenAiClient::new(&config).unwrap();

        let bare_tool_message = LlmMessage {
            role: MessageRole::Tool,
            content: MessageContent::Text("orphaned".to_string()),
        };
        assert!(client.convert_messages(vec![bare_tool_message]).is_err());
    }
}
