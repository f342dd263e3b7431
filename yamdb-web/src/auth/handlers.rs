//! Signup and token endpoints

use crate::{
    error::{ApiJson, ApiResult, ErrorBody},
    handlers::types::{SignupRequest, SignupResponse, TokenRequest, TokenResponse},
    AppState,
};
use axum::{extract::State, response::Json};
use tracing::info;

/// Request a confirmation code
///
/// Creates an inactive account, or mails a fresh code when the exact
/// username and email pair is already registered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = SignupResponse),
        (status = 400, description = "Invalid or conflicting fields", body = ErrorBody)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    info!("Signup attempt: {}", request.username);

    state.users.signup(&request.username, &request.email).await?;
    Ok(Json(request))
}

/// Exchange a confirmation code for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    tag = "Auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or wrong code", body = ErrorBody),
        (status = 404, description = "Unknown username", body = ErrorBody)
    )
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    info!("Token request: {}", request.username);

    let token = state
        .users
        .obtain_token(&request.username, &request.confirmation_code)
        .await?;
    Ok(Json(TokenResponse { token }))
}
