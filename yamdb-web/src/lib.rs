//! YaMDb Web Server
//!
//! HTTP API for the review service: accounts and signup, the title catalog,
//! reviews with their comments, and an OpenAPI document describing it all.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use config::WebConfig;
pub use error::{ApiError, ApiResult};
pub use server::{YamdbServer, YamdbServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use yamdb_core::YamdbError;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

fn cors_layer(dev_mode: bool) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    if dev_mode {
        let origins: Vec<HeaderValue> = DEV_ORIGINS
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    } else {
        cors
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.dev_mode);

    Router::new()
        // Versioned resource API
        .nest("/api/v1", routes::v1_routes(&state))
        // Health and documentation
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] YamdbError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server from its configuration
pub fn init_logging(config: &WebConfig) -> WebResult<()> {
    yamdb_core::init_logging(&config.logging)
        .map_err(|e| WebError::Config(format!("Failed to initialize logging: {}", e)))
}
