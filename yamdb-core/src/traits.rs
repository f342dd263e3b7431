//! Collaborator traits
//!
//! The signup and token flows depend on a notification channel and a token
//! minting service. Implementations live in the web crate.

use crate::error::YamdbResult;
use crate::types::User;
use async_trait::async_trait;

/// Outgoing message channel (email in production)
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> YamdbResult<()>;
}

/// Mints signed access tokens bound to a user identity
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> YamdbResult<String>;
}
