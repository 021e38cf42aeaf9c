//! Built-in tools

pub mod crypto;
pub mod email;

pub use crypto::CryptoInfoTool;
pub use email::{MailTransport, OutgoingMail, SendEmailTool, SmtpMailer};
