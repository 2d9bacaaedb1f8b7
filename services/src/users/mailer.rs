//! Delivery of password reset tokens.

use std::sync::{Arc, RwLock};

use tracing::info;

/// Sends a reset token to the account owner.
pub trait ResetMailer: Send + Sync + 'static {
    fn send_reset(&self, email: &str, token: &str) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to deliver reset email: {0}")]
pub struct MailerError(pub String);

/// Writes the reset token to the service log instead of sending mail.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl ResetMailer for LogMailer {
    fn send_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        info!(email = %email, reset_token = %token, "Password reset requested");
        Ok(())
    }
}

/// Keeps every sent token in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(email, token)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().expect("lock poisoned").clone()
    }

    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .read()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

impl ResetMailer for RecordingMailer {
    fn send_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        self.sent
            .write()
            .expect("lock poisoned")
            .push((email.to_owned(), token.to_owned()));
        Ok(())
    }
}
