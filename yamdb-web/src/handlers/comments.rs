//! Comments on a review

use super::{
    reviews::load_review,
    types::{CommentRequest, CommentResponse},
};
use crate::{
    auth::{AuthUser, Requester},
    error::{ApiJson, ApiPath, ApiResult, ErrorBody},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;
use yamdb_core::{
    not_found_error, Comment, CommentId, MethodClass, Policy, ReviewId, TitleId, YamdbResult,
};

/// Listing and lookups are keyed by the review alone
async fn ensure_review(state: &AppState, review_id: ReviewId) -> YamdbResult<()> {
    match state.database.review_by_id(review_id).await? {
        Some(_) => Ok(()),
        None => Err(not_found_error!(format!("review {}", review_id))),
    }
}

async fn load_comment(
    state: &AppState,
    review_id: ReviewId,
    comment_id: CommentId,
) -> YamdbResult<Comment> {
    ensure_review(state, review_id).await?;
    state
        .database
        .comment_for_review(review_id, comment_id)
        .await?
        .ok_or_else(|| not_found_error!(format!("comment {}", comment_id)))
}

/// Comments on a review, newest first
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Comments", body = [CommentResponse]),
        (status = 404, description = "No such review", body = ErrorBody)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath((_title_id, review_id)): ApiPath<(TitleId, ReviewId)>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    ensure_review(&state, review_id).await?;
    let comments = state.database.list_comments(review_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "No such comment on this review", body = ErrorBody)
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    ApiPath((_title_id, review_id, comment_id)): ApiPath<(TitleId, ReviewId, CommentId)>,
) -> ApiResult<Json<CommentResponse>> {
    Ok(Json(load_comment(&state, review_id, comment_id).await?.into()))
}

/// Comment on a review of the title in the path
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Blank text", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Review does not belong to the title", body = ErrorBody)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    ApiPath((title_id, review_id)): ApiPath<(TitleId, ReviewId)>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let review = load_review(&state, title_id, review_id).await?;
    request.validate()?;

    let comment = state
        .database
        .create_comment(review.id, author.id, &request.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Edit a comment; author, moderators and administrators only
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such comment on this review", body = ErrorBody)
    )
)]
pub async fn update_comment(
    State(state): State<AppState>,
    requester: Requester,
    ApiPath((_title_id, review_id, comment_id)): ApiPath<(TitleId, ReviewId, CommentId)>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    let comment = load_comment(&state, review_id, comment_id).await?;
    requester.authorize_object(Policy::FEEDBACK, MethodClass::Unsafe, &comment)?;
    request.validate()?;

    let updated = state
        .database
        .update_comment(comment.id, &request.text)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such comment on this review", body = ErrorBody)
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    requester: Requester,
    ApiPath((_title_id, review_id, comment_id)): ApiPath<(TitleId, ReviewId, CommentId)>,
) -> ApiResult<StatusCode> {
    let comment = load_comment(&state, review_id, comment_id).await?;
    requester.authorize_object(Policy::FEEDBACK, MethodClass::Unsafe, &comment)?;

    state.database.delete_comment(comment.id).await?;
    info!("Deleted comment {} on review {}", comment.id, review_id);
    Ok(StatusCode::NO_CONTENT)
}
