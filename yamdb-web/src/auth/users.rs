//! Signup and token exchange

use crate::db::Database;
use std::sync::Arc;
use tracing::{debug, info};
use yamdb_core::{
    conflict_error, not_found_error, validation::{self, new_confirmation_code},
    validation_error, Mailer, NewUser, TokenIssuer, User, YamdbError, YamdbResult,
};

pub const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

/// Confirmation-code account flow
#[derive(Clone)]
pub struct UserService {
    database: Database,
    mailer: Arc<dyn Mailer>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserService {
    pub fn new(database: Database, mailer: Arc<dyn Mailer>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            database,
            mailer,
            tokens,
        }
    }

    async fn send_code(&self, user: &User, code: &str) -> YamdbResult<()> {
        let body = format!(
            "Hello, {}!\n\nYour confirmation code: {}",
            user.username, code
        );
        self.mailer
            .send(&user.email, CONFIRMATION_SUBJECT, &body)
            .await
    }

    /// Register an inactive account, or reissue the code for an existing
    /// exact (username, email) pair. Either way a fresh code is mailed.
    pub async fn signup(&self, username: &str, email: &str) -> YamdbResult<User> {
        validation::validate_username(username)?;
        validation::validate_email(email)?;

        let code = new_confirmation_code();

        if let Some(existing) = self
            .database
            .user_by_username_and_email(username, email)
            .await?
        {
            self.database
                .set_confirmation_code(existing.id, &code)
                .await?;
            self.send_code(&existing, &code).await?;
            info!("🔁 Reissued confirmation code for {}", username);
            return Ok(existing);
        }

        if self.database.user_by_username(username).await?.is_some() {
            return Err(conflict_error!(
                "A user with that username already exists.",
                "username"
            ));
        }
        if self.database.user_by_email(email).await?.is_some() {
            return Err(conflict_error!(
                "A user with that email already exists.",
                "email"
            ));
        }

        let user = self
            .database
            .create_user(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                confirmation_code: code.clone(),
                is_active: false,
                ..NewUser::default()
            })
            .await?;
        self.send_code(&user, &code).await?;

        info!("✉️  Signup for {} awaiting confirmation", username);
        Ok(user)
    }

    /// Exchange a confirmation code for an access token
    pub async fn obtain_token(&self, username: &str, confirmation_code: &str) -> YamdbResult<String> {
        if username.trim().is_empty() {
            return Err(validation_error!("This field may not be blank.", "username"));
        }
        if confirmation_code.trim().is_empty() {
            return Err(validation_error!(
                "This field may not be blank.",
                "confirmation_code"
            ));
        }

        let user = self
            .database
            .user_by_username(username)
            .await?
            .ok_or_else(|| not_found_error!(format!("user {}", username)))?;

        if !user.confirmation_code_matches(confirmation_code) {
            debug!("Confirmation code mismatch for {}", username);
            return Err(YamdbError::InvalidConfirmationCode);
        }

        if !user.is_active {
            self.database.activate_user(user.id).await?;
        }

        let token = self.tokens.issue(&user)?;
        info!("🔑 Issued access token for {}", username);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::JwtService, mailer::MemoryMailer};

    async fn service() -> (UserService, Arc<MemoryMailer>, Database) {
        let database = Database::connect("sqlite::memory:").await.unwrap();
        let mailer = Arc::new(MemoryMailer::new("noreply@yamdb.local"));
        let tokens = Arc::new(JwtService::new("test-secret", 60));
        (
            UserService::new(database.clone(), mailer.clone(), tokens),
            mailer,
            database,
        )
    }

    fn mailed_code(mailer: &MemoryMailer, to: &str) -> String {
        let mail = mailer.last_to(to).unwrap();
        mail.body.rsplit(' ').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_signup_creates_inactive_user_and_mails_code() {
        let (service, mailer, database) = service().await;
        service.signup("critic", "critic@example.com").await.unwrap();

        let stored = database.user_by_username("critic").await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(mailed_code(&mailer, "critic@example.com"), stored.confirmation_code);
    }

    #[tokio::test]
    async fn test_repeat_signup_reissues_code_without_new_row() {
        let (service, mailer, database) = service().await;
        service.signup("critic", "critic@example.com").await.unwrap();
        let first = mailed_code(&mailer, "critic@example.com");

        service.signup("critic", "critic@example.com").await.unwrap();
        let second = mailed_code(&mailer, "critic@example.com");

        assert_ne!(first, second);
        assert_eq!(database.list_users(None).await.unwrap().len(), 1);
        let stored = database.user_by_username("critic").await.unwrap().unwrap();
        assert_eq!(stored.confirmation_code, second);
    }

    #[tokio::test]
    async fn test_partial_match_is_conflict() {
        let (service, _, _) = service().await;
        service.signup("critic", "critic@example.com").await.unwrap();

        let err = service.signup("critic", "other@example.com").await.unwrap_err();
        assert_eq!(err.field(), Some("username"));
        let err = service.signup("other", "critic@example.com").await.unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test]
    async fn test_reserved_username_never_signs_up() {
        let (service, mailer, _) = service().await;
        let err = service.signup("me", "me@example.com").await.unwrap_err();
        assert!(matches!(err, YamdbError::Validation { .. }));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_token_exchange() {
        let (service, mailer, database) = service().await;
        service.signup("critic", "critic@example.com").await.unwrap();
        let code = mailed_code(&mailer, "critic@example.com");

        let err = service.obtain_token("critic", "wrong").await.unwrap_err();
        assert!(matches!(err, YamdbError::InvalidConfirmationCode));

        let err = service.obtain_token("ghost", &code).await.unwrap_err();
        assert!(matches!(err, YamdbError::NotFound { .. }));

        let err = service.obtain_token("critic", "").await.unwrap_err();
        assert_eq!(err.field(), Some("confirmation_code"));

        let token = service.obtain_token("critic", &code).await.unwrap();
        assert!(!token.is_empty());
        assert!(database.user_by_username("critic").await.unwrap().unwrap().is_active);
    }
}
