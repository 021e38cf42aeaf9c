//! Resolved configuration types for chainchat core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use serde::{Deserialize, Serialize};

/// Default base URL for the OpenAI-compatible chat endpoint
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Default mail submission host
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Model parameters for chat requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Temperature for sampling
    pub temperature: Option<f32>,

    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// A fully resolved chat endpoint configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the API
    pub base_url: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name/identifier
    pub model: String,

    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl LlmConfig {
    /// Create a new config with the default base URL
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            params: ModelParams::default(),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err("Top-p must be between 0.0 and 1.0".to_string());
            }
        }

        Ok(())
    }
}

/// Sender-side mail settings.
///
/// Credentials are optional: their absence is a recoverable per-send
/// condition surfaced to the model as tool output, not a startup failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Mail submission host (implicit-TLS SMTP, port 465)
    pub smtp_host: String,

    /// Sender address, doubling as the SMTP username
    pub sender: Option<String>,

    /// Sender password or app-specific credential
    pub password: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            sender: None,
            password: None,
        }
    }
}

impl MailConfig {
    /// Return the credential pair, or None unless both parts are present
    pub fn credentials(&self) -> Option<MailCredentials> {
        match (&self.sender, &self.password) {
            (Some(sender), Some(password)) if !sender.is_empty() && !password.is_empty() => {
                Some(MailCredentials {
                    username: sender.clone(),
                    password: password.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Username/password pair for authenticated mail submission
#[derive(Debug, Clone)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_api_key() {
        let config = LlmConfig::new("", "gpt-4o");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let config = LlmConfig::new("key", "gpt-4o").with_base_url("ftp://example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let config = LlmConfig::new("key", "gpt-4o").with_params(ModelParams {
            temperature: Some(3.0),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_resolved_config() {
        let config = LlmConfig::new("key", "gpt-4o");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn credentials_require_both_parts() {
        let mut config = MailConfig::default();
        assert!(config.credentials().is_none());

        config.sender = Some("alerts@example.com".to_string());
        assert!(config.credentials().is_none());

        config.password = Some("hunter2".to_string());
        let credentials = config.credentials().expect("both parts set");
        assert_eq!(credentials.username, "alerts@example.com");
    }

    #[test]
    fn credentials_reject_empty_strings() {
        let config = MailConfig {
            sender: Some(String::new()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert!(config.credentials().is_none());
    }
}
