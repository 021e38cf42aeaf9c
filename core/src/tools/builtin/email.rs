//! Email sending tool over authenticated SMTPS

use crate::config::{MailConfig, MailCredentials};
use crate::error::{Error, Result};
use crate::tools::{Tool, ToolCall, ToolResult};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use std::time::Duration;

/// Error message when sender credentials are not configured
const CREDENTIALS_ERROR: &str = "Email credentials not configured";

const SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// A plain-text message ready for submission
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Narrow seam over the mail submission endpoint
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message through an authenticated session
    async fn deliver(&self, mail: &OutgoingMail, credentials: &MailCredentials) -> Result<()>;
}

/// Production transport: one authenticated implicit-TLS session (port 465)
/// per delivery, no pooling
pub struct SmtpMailer {
    host: String,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, mail: &OutgoingMail, credentials: &MailCredentials) -> Result<()> {
        let message = Message::builder()
            .from(
                mail.from
                    .parse()
                    .map_err(|e| Error::Generic(format!("invalid sender address: {}", e)))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|e| Error::Generic(format!("invalid recipient address: {}", e)))?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| Error::Generic(e.to_string()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| Error::Generic(e.to_string()))?
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(SUBMISSION_TIMEOUT))
            .build();

        mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| Error::Generic(e.to_string()))
    }
}

/// Tool that emails a summary to a recipient on the model's request
pub struct SendEmailTool {
    config: MailConfig,
    transport: Box<dyn MailTransport>,
}

impl SendEmailTool {
    /// Build with the production SMTPS transport
    pub fn new(config: MailConfig) -> Self {
        let transport = Box::new(SmtpMailer::new(config.smtp_host.clone()));
        Self { config, transport }
    }

    /// Build with a custom transport
    pub fn with_transport(config: MailConfig, transport: Box<dyn MailTransport>) -> Self {
        Self { config, transport }
    }
}

#[async_trait::async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email with crypto information to the email address provided"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": {
                    "type": "string",
                    "description": "The recipient's email address",
                },
                "subject": {
                    "type": "string",
                    "description": "The subject of the email",
                },
                "body": {
                    "type": "string",
                    "description": "The body content of the email",
                },
            },
            "required": ["to_email", "subject", "body"],
        })
    }

    async fn execute(&self, call: ToolCall) -> ToolResult {
        let to_email: String = match call.get_parameter("to_email") {
            Ok(value) => value,
            Err(e) => return ToolResult::error(call.id, e.to_string()),
        };
        let subject: String = match call.get_parameter("subject") {
            Ok(value) => value,
            Err(e) => return ToolResult::error(call.id, e.to_string()),
        };
        let body: String = match call.get_parameter("body") {
            Ok(value) => value,
            Err(e) => return ToolResult::error(call.id, e.to_string()),
        };

        // Credentials are checked before any transport activity
        let Some(credentials) = self.config.credentials() else {
            tracing::warn!("send_email requested but no sender credentials are configured");
            return ToolResult::error(call.id, CREDENTIALS_ERROR);
        };

        let mail = OutgoingMail {
            from: credentials.username.clone(),
            to: to_email,
            subject,
            body,
        };

        match self.transport.deliver(&mail, &credentials).await {
            Ok(()) => ToolResult::success(call.id, json!({"status": "Email sent successfully"})),
            Err(e) => {
                tracing::warn!(error = %e, "mail submission failed");
                ToolResult::error(call.id, format!("Failed to send email: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts deliveries; optionally fails each one with a fixed message
    struct CountingTransport {
        deliveries: Arc<AtomicUsize>,
        fail_with: Option<String>,
    }

    #[async_trait::async_trait]
    impl MailTransport for CountingTransport {
        async fn deliver(&self, _mail: &OutgoingMail, _credentials: &MailCredentials) -> Result<()> {
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(Error::Generic(message.clone())),
                None => Ok(()),
            }
        }
    }

    fn configured() -> MailConfig {
        MailConfig {
            sender: Some("alerts@example.com".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    fn send_call() -> ToolCall {
        ToolCall::new(
            "send_email",
            json!({
                "to_email": "user@example.com",
                "subject": "BTC update",
                "body": "Bitcoin is at $50000.",
            }),
        )
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit_before_transport() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let tool = SendEmailTool::with_transport(
            MailConfig::default(),
            Box::new(CountingTransport {
                deliveries: deliveries.clone(),
                fail_with: None,
            }),
        );

        let result = tool.execute(send_call()).await;

        assert!(!result.success);
        assert_eq!(
            result.payload,
            json!({"error": "Email credentials not configured"})
        );
        assert_eq!(deliveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_delivery_reports_status() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let tool = SendEmailTool::with_transport(
            configured(),
            Box::new(CountingTransport {
                deliveries: deliveries.clone(),
                fail_with: None,
            }),
        );

        let result = tool.execute(send_call()).await;

        assert!(result.success);
        assert_eq!(result.payload, json!({"status": "Email sent successfully"}));
        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_wrapped_not_raised() {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let tool = SendEmailTool::with_transport(
            configured(),
            Box::new(CountingTransport {
                deliveries: deliveries.clone(),
                fail_with: Some("535 authentication failed".to_string()),
            }),
        );

        let result = tool.execute(send_call()).await;

        assert!(!result.success);
        assert_eq!(
            result.payload,
            json!({"error": "Failed to send email: 535 authentication failed"})
        );
    }

    #[tokio::test]
    async fn missing_recipient_is_reported_as_parameter_error() {
        let tool = SendEmailTool::with_transport(
            configured(),
            Box::new(CountingTransport {
                deliveries: Arc::new(AtomicUsize::new(0)),
                fail_with: None,
            }),
        );

        let call = ToolCall::new("send_email", json!({"subject": "x", "body": "y"}));
        let result = tool.execute(call).await;

        assert!(!result.success);
        let message = result.payload["error"].as_str().unwrap();
        assert!(message.contains("to_email"), "got: {message}");
    }
}
