//! CLI configuration loader for chainchat
//!
//! Implements single-source priority loading with flag overrides:
//! 1. Flag overrides (highest priority)
//! 2. --config file
//! 3. ./chainchat.json in the working directory
//! 4. Environment variables

use anyhow::{anyhow, Context, Result};
use chainchat_core::config::types::{DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_SMTP_HOST};
use chainchat_core::{LlmConfig, MailConfig, ModelParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Chat API key (can be "env:VAR_NAME" for environment indirection)
    pub api_key: Option<String>,

    /// Chat endpoint base URL
    pub base_url: Option<String>,

    /// Model name
    pub model: Option<String>,

    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,

    /// Sender address for outgoing mail
    pub sender_email: Option<String>,

    /// Sender password (can be "env:VAR_NAME")
    pub sender_password: Option<String>,

    /// Mail submission host
    pub smtp_host: Option<String>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    smtp_host_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
            smtp_host_override: None,
        }
    }

    /// Set config file override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set mail submission host override
    pub fn with_smtp_host_override(mut self, smtp_host: String) -> Self {
        self.smtp_host_override = Some(smtp_host);
        self
    }

    /// Load and resolve the chat and mail configuration.
    ///
    /// A missing chat API key is an error here, before any conversation
    /// starts. Missing mail credentials are not: they surface per send.
    pub fn load(&self) -> Result<(LlmConfig, MailConfig)> {
        let mut raw = if let Some(override_path) = &self.config_override {
            Self::load_file(override_path).with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            let default_path = Path::new("chainchat.json");
            if default_path.exists() {
                Self::load_file(default_path)?
            } else {
                RawConfig::default()
            }
        };

        // Fill gaps from the environment
        raw.api_key = raw.api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
        raw.base_url = raw.base_url.or_else(|| std::env::var("OPENAI_BASE_URL").ok());
        raw.model = raw.model.or_else(|| std::env::var("OPENAI_MODEL").ok());
        raw.sender_email = raw
            .sender_email
            .or_else(|| std::env::var("SENDER_EMAIL").ok());
        raw.sender_password = raw
            .sender_password
            .or_else(|| std::env::var("SENDER_PASSWORD").ok());
        raw.smtp_host = raw.smtp_host.or_else(|| std::env::var("SMTP_HOST").ok());

        // Apply flag overrides
        if let Some(api_key) = &self.api_key_override {
            raw.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            raw.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            raw.model = Some(model.clone());
        }
        if let Some(smtp_host) = &self.smtp_host_override {
            raw.smtp_host = Some(smtp_host.clone());
        }

        self.resolve(raw)
    }

    /// Resolve raw values into validated core configuration
    fn resolve(&self, raw: RawConfig) -> Result<(LlmConfig, MailConfig)> {
        let api_key = raw.api_key.ok_or_else(|| {
            anyhow!("No chat API key configured. Set OPENAI_API_KEY or add api_key to chainchat.json")
        })?;
        let api_key = Self::resolve_secret(api_key)?;

        let sender_password = raw
            .sender_password
            .map(Self::resolve_secret)
            .transpose()?;

        let llm_config = LlmConfig {
            base_url: raw
                .base_url
                .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
            api_key,
            model: raw.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            params: raw.params,
        };
        llm_config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        let mail_config = MailConfig {
            smtp_host: raw
                .smtp_host
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            sender: raw.sender_email,
            password: sender_password,
        };

        Ok((llm_config, mail_config))
    }

    /// Load a single config file
    fn load_file(path: &Path) -> Result<RawConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the "env:VAR_NAME" indirection for secrets
    fn resolve_secret(value: String) -> Result<String> {
        match value.strip_prefix("env:") {
            Some(var_name) => std::env::var(var_name)
                .with_context(|| format!("Environment variable not found: {}", var_name)),
            None => Ok(value),
        }
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn config_file_supplies_chat_and_mail_settings() {
        let file = write_config(
            r#"{
                "api_key": "file-key",
                "base_url": "https://llm.internal/v1",
                "model": "gpt-4o-mini",
                "sender_email": "alerts@example.com",
                "sender_password": "hunter2",
                "smtp_host": "smtp.example.com"
            }"#,
        );

        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let (llm_config, mail_config) = loader.load().unwrap();

        assert_eq!(llm_config.api_key, "file-key");
        assert_eq!(llm_config.base_url, "https://llm.internal/v1");
        assert_eq!(llm_config.model, "gpt-4o-mini");
        assert_eq!(mail_config.smtp_host, "smtp.example.com");
        assert!(mail_config.credentials().is_some());
    }

    #[test]
    fn flag_overrides_beat_the_config_file() {
        let file = write_config(r#"{"api_key": "file-key", "model": "gpt-4o"}"#);

        let loader = CliConfigLoader::new()
            .with_config_override(file.path().to_path_buf())
            .with_api_key_override("flag-key".to_string())
            .with_model_override("gpt-4o-mini".to_string());
        let (llm_config, _) = loader.load().unwrap();

        assert_eq!(llm_config.api_key, "flag-key");
        assert_eq!(llm_config.model, "gpt-4o-mini");
    }

    #[test]
    fn defaults_apply_when_file_only_has_the_key() {
        let file = write_config(r#"{"api_key": "file-key"}"#);

        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let (llm_config, mail_config) = loader.load().unwrap();

        assert_eq!(llm_config.base_url, DEFAULT_CHAT_BASE_URL);
        assert_eq!(llm_config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(mail_config.smtp_host, DEFAULT_SMTP_HOST);
        assert!(mail_config.credentials().is_none());
    }

    #[test]
    fn env_indirection_resolves_through_the_named_variable() {
        // Uniquely named to avoid clashing with parallel tests
        std::env::set_var("CHAINCHAT_TEST_SECRET_7391", "indirect-key");
        let file = write_config(r#"{"api_key": "env:CHAINCHAT_TEST_SECRET_7391"}"#);

        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let (llm_config, _) = loader.load().unwrap();

        assert_eq!(llm_config.api_key, "indirect-key");
        std::env::remove_var("CHAINCHAT_TEST_SECRET_7391");
    }

    #[test]
    fn unresolvable_env_indirection_is_an_error() {
        let file = write_config(r#"{"api_key": "env:CHAINCHAT_TEST_UNSET_7392"}"#);

        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        assert!(loader.load().is_err());
    }
}
