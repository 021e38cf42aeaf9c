//! Conversation orchestrator: the two-phase tool-call exchange

use super::config::AgentConfig;
use crate::config::{LlmConfig, MailConfig, ModelParams};
use crate::error::Result;
use crate::llm::{
    ChatOptions, ContentBlock, LlmClient, LlmMessage, OpenAiClient, ToolChoice,
};
use crate::tools::builtin::{CryptoInfoTool, SendEmailTool};
use crate::tools::{ToolCall, ToolRegistry};
use std::sync::Arc;

/// Drives the conversation with the chat model and dispatches its tool calls.
///
/// Owns the full message history for the lifetime of the process. The history
/// grows monotonically and is never truncated.
pub struct AgentCore {
    config: AgentConfig,
    params: ModelParams,
    llm_client: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    conversation_history: Vec<LlmMessage>,
}

impl AgentCore {
    /// Create an orchestrator wired to the production client and tools
    pub fn new(config: AgentConfig, llm_config: &LlmConfig, mail_config: MailConfig) -> Result<Self> {
        let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(llm_config)?);
        let registry = ToolRegistry::new(CryptoInfoTool::new(), SendEmailTool::new(mail_config));

        let mut agent = Self::with_client_and_registry(config, llm_client, registry);
        agent.params = llm_config.params.clone();
        Ok(agent)
    }

    /// Create an orchestrator over a custom client and registry
    pub fn with_client_and_registry(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        registry: ToolRegistry,
    ) -> Self {
        Self {
            config,
            params: ModelParams::default(),
            llm_client,
            registry,
            conversation_history: Vec::new(),
        }
    }

    /// The full conversation history, in model-context order
    pub fn history(&self) -> &[LlmMessage] {
        &self.conversation_history
    }

    /// Run one user turn through the two-phase exchange.
    ///
    /// Every failure mode degrades to reply text; no fault escapes to the
    /// console loop and the conversation stays usable afterward.
    pub async fn chat(&mut self, input: &str) -> String {
        if self.conversation_history.is_empty() {
            self.conversation_history
                .push(LlmMessage::system(self.config.system_prompt.clone()));
        }
        self.conversation_history.push(LlmMessage::user(input));

        let reply = self.run_turn().await;

        self.conversation_history
            .push(LlmMessage::assistant(reply.clone()));
        reply
    }

    async fn run_turn(&mut self) -> String {
        let definitions = self.registry.definitions();
        let options = ChatOptions {
            tool_choice: Some(ToolChoice::Auto),
            ..self.base_options()
        };

        let response = match self
            .llm_client
            .chat_completion(
                self.conversation_history.clone(),
                Some(definitions),
                Some(options),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                return format!("An error occurred: {}", e);
            }
        };

        if !response.message.has_tool_use() {
            return response.message.text().unwrap_or_default();
        }

        // The tool-call-bearing assistant message is kept verbatim so the
        // model sees its own request when the results come back.
        self.conversation_history.push(response.message.clone());

        for block in response.message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let call = ToolCall {
                id: id.clone(),
                name: name.clone(),
                parameters: input.clone(),
            };
            let result = self.registry.dispatch(call).await;

            self.conversation_history.push(LlmMessage::tool_result(
                id.clone(),
                name.clone(),
                result.content(),
                !result.success,
            ));
        }

        // Second round collects the natural-language summary. No tool
        // schemas are attached, so the exchange ends here; a tool result
        // never triggers another dispatch.
        match self
            .llm_client
            .chat_completion(
                self.conversation_history.clone(),
                None,
                Some(self.base_options()),
            )
            .await
        {
            Ok(followup) => followup.message.text().unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "follow-up chat request failed");
                format!("An error occurred in the follow-up request: {}", e)
            }
        }
    }

    fn base_options(&self) -> ChatOptions {
        let defaults = ChatOptions::default();
        ChatOptions {
            max_tokens: self.params.max_tokens.or(defaults.max_tokens),
            temperature: self.params.temperature.or(defaults.temperature),
            top_p: self.params.top_p.or(defaults.top_p),
            tool_choice: None,
        }
    }
}
