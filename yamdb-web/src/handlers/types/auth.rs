//! Signup and token bodies

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    #[schema(example = "critic")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "critic@example.com")]
    pub email: String,
}

/// Echo of the accepted signup
pub type SignupResponse = SignupRequest;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub confirmation_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer access token
    pub token: String,
}
