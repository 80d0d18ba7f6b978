//! Contact-form mail relay
//!
//! The contact endpoint validates a submission, renders it into a
//! [`ContactEmail`] and hands it to a [`Mailer`]. The production mailer is
//! [`SmtpMailer`]; tests plug in their own implementations.

/// Submission validation and message rendering.
pub mod contact;
/// SMTP transport built on lettre.
pub mod smtp;

pub use contact::{ContactEmail, ContactSubmission};
pub use smtp::SmtpMailer;

use crate::types::AppError;
use async_trait::async_trait;

/// Something that can deliver a rendered contact email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the email to the configured recipient.
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError>;

    /// Short transport description for logs, e.g. `smtp://smtp.gmail.com:465`.
    fn describe(&self) -> String;
}

/// Failures raised while delivering a contact email
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not build message: {0}")]
    Message(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl MailError {
    /// Sort a raw transport failure into auth, network or other.
    pub fn classify(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let lower = detail.to_lowercase();

        const AUTH_MARKERS: &[&str] = &[
            "authentication",
            "invalid login",
            "username and password not accepted",
            "credentials",
        ];
        const NETWORK_MARKERS: &[&str] = &[
            "connection",
            "timed out",
            "timeout",
            "dns",
            "resolve",
            "lookup",
            "unreachable",
            "refused",
            "enotfound",
        ];

        if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
            MailError::Auth(detail)
        } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
            MailError::Network(detail)
        } else {
            MailError::Transport(detail)
        }
    }

    /// Sort a failure by its SMTP reply code, falling back to the text when
    /// the server never replied.
    pub fn from_status(status: Option<u16>, detail: impl Into<String>) -> Self {
        match status {
            Some(454 | 530 | 534 | 535) => MailError::Auth(detail.into()),
            Some(421) => MailError::Network(detail.into()),
            Some(_) => MailError::Transport(detail.into()),
            None => MailError::classify(detail),
        }
    }

    /// Message safe to show to the person who filled in the form.
    pub fn user_message(&self) -> String {
        match self {
            MailError::Auth(_) => {
                "Email authentication failed. Please check your SMTP credentials.".to_string()
            }
            MailError::Network(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            MailError::Message(detail) | MailError::Transport(detail) => {
                format!("Email error: {}", detail)
            }
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::Mail(err.user_message())
    }
}
