//! Outgoing mail
//!
//! No SMTP transport is wired in. [`LogMailer`] writes messages to the log,
//! [`MemoryMailer`] keeps them for inspection.

use std::sync::Mutex;
use tracing::info;
use yamdb_core::{async_trait, Mailer, YamdbError, YamdbResult};

/// Message captured by [`MemoryMailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Writes every message to the log instead of delivering it
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> YamdbResult<()> {
        info!(from = %self.from, to, subject, "📧 {}", body);
        Ok(())
    }
}

/// Keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryMailer {
    from: String,
    outbox: Mutex<Vec<SentMail>>,
}

impl MemoryMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// Most recent message addressed to `to`
    pub fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent().into_iter().rev().find(|mail| mail.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> YamdbResult<()> {
        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| YamdbError::internal("Mail outbox lock poisoned"))?;
        outbox.push(SentMail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_mailer_records_messages() {
        let mailer = MemoryMailer::new("noreply@yamdb.local");
        mailer.send("a@example.com", "Hi", "first").await.unwrap();
        mailer.send("b@example.com", "Hi", "second").await.unwrap();
        mailer.send("a@example.com", "Hi", "third").await.unwrap();

        assert_eq!(mailer.sent().len(), 3);
        let last = mailer.last_to("a@example.com").unwrap();
        assert_eq!(last.body, "third");
        assert_eq!(last.from, "noreply@yamdb.local");
        assert!(mailer.last_to("c@example.com").is_none());
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mailer = LogMailer::new("noreply@yamdb.local");
        assert!(mailer.send("a@example.com", "Hi", "body").await.is_ok());
    }
}
