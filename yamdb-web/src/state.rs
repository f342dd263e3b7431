//! Shared application state

use crate::{
    auth::{jwt::JwtService, mailer::LogMailer, users::UserService},
    db::Database,
    WebConfig, WebResult,
};
use std::sync::Arc;
use tracing::info;
use yamdb_core::Mailer;

/// Everything a request handler may touch. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebConfig>,
    pub database: Database,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<JwtService>,
    pub users: UserService,
}

impl AppState {
    /// State with the logging mailer
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));
        Self::with_mailer(config, mailer).await
    }

    /// State with a caller-supplied mail channel
    pub async fn with_mailer(config: WebConfig, mailer: Arc<dyn Mailer>) -> WebResult<Self> {
        config.validate()?;

        let database = Database::connect(&config.database_url).await?;
        let tokens = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.token_ttl_minutes,
        ));
        let users = UserService::new(database.clone(), mailer.clone(), tokens.clone());

        if let Some((username, email)) = config.bootstrap_admin() {
            let admin = database.ensure_superuser(username, email).await?;
            info!("🛡️  Bootstrap administrator ready: {}", admin.username);
        }

        info!("Application state initialized successfully");
        Ok(Self {
            config: Arc::new(config),
            database,
            mailer,
            tokens,
            users,
        })
    }
}
