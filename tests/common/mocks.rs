//! Mock mailers for testing.
//!
//! Lets the contact endpoint be exercised end to end without an SMTP server.

use async_trait::async_trait;
use hatch::Mailer;
use hatch::mail::{ContactEmail, MailError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mailer that keeps every email it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<ContactEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ContactEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError> {
        self.sent.lock().push(email.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "recording://memory".to_string()
    }
}

/// Which failure a [`FailingMailer`] reports.
#[derive(Clone, Copy, Debug)]
pub enum FailureKind {
    Auth,
    Network,
    Other,
}

/// Mailer that always fails with the configured error.
#[derive(Clone, Copy)]
pub struct FailingMailer {
    kind: FailureKind,
}

impl FailingMailer {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &ContactEmail) -> Result<(), MailError> {
        Err(match self.kind {
            FailureKind::Auth => MailError::classify("535 5.7.8 Username and Password not accepted"),
            FailureKind::Network => MailError::classify("Connection refused (os error 111)"),
            FailureKind::Other => MailError::classify("mailbox unavailable"),
        })
    }

    fn describe(&self) -> String {
        format!("failing://{:?}", self.kind)
    }
}
