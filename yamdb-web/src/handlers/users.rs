//! Account administration and self-service profile

use super::types::{CreateUserRequest, SearchQuery, UpdateUserRequest, UserResponse};
use crate::{
    auth::AuthUser,
    error::{ApiJson, ApiPath, ApiQuery, ApiResult, ErrorBody},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;
use yamdb_core::{not_found_error, User, YamdbResult};

async fn load_user(state: &AppState, username: &str) -> YamdbResult<User> {
    state
        .database
        .user_by_username(username)
        .await?
        .ok_or_else(|| not_found_error!(format!("user {}", username)))
}

/// List accounts
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(SearchQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Accounts ordered by username", body = [UserResponse]),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.database.list_users(query.search.as_deref()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create an active account
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid or conflicting fields", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let new_user = request.into_new_user()?;
    let user = state.database.create_user(&new_user).await?;

    info!("Administrator created user {}", user.username);
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Account username")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 404, description = "No such account", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = load_user(&state, &username).await?;
    Ok(Json(user.into()))
}

/// Partially update any account, role included
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Account username")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid or conflicting fields", body = ErrorBody),
        (status = 404, description = "No such account", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = load_user(&state, &username).await?;
    let changes = request.into_changes()?;
    let updated = state.database.update_user(user.id, &changes).await?;
    Ok(Json(updated.into()))
}

/// Delete an account together with its reviews and comments
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Account username")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such account", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<StatusCode> {
    if !state.database.delete_user(&username).await? {
        return Err(not_found_error!(format!("user {}", username)).into());
    }
    info!("Deleted user {}", username);
    Ok(StatusCode::NO_CONTENT)
}

/// Own profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requester's account", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Edit own profile. The role never changes here.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    tag = "Users",
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid or conflicting fields", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let mut changes = request.into_changes()?;
    changes.role = Some(user.role);

    let updated = state.database.update_user(user.id, &changes).await?;
    Ok(Json(updated.into()))
}
