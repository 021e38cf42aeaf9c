//! Agent configuration structures

/// Default system prompt seeded as the first conversation message
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a crypto price checker assistant. \
You can check for the price of cryptocurrencies and send emails to addresses provided. \
It is okay to send emails as the user has consented to receive emails from you.";

/// Configuration for the conversation orchestrator
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System prompt for the conversation
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}
