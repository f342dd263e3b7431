//! Reviews of a title

use super::types::{CreateReviewRequest, ReviewResponse, UpdateReviewRequest};
use crate::{
    auth::{AuthUser, Requester},
    error::{ApiJson, ApiPath, ApiResult, ErrorBody},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;
use yamdb_core::{not_found_error, MethodClass, Policy, Review, ReviewId, TitleId, YamdbResult};

async fn ensure_title(state: &AppState, title_id: TitleId) -> YamdbResult<()> {
    if state.database.title_exists(title_id).await? {
        Ok(())
    } else {
        Err(not_found_error!(format!("title {}", title_id)))
    }
}

/// Review that belongs to the title in the path
pub(crate) async fn load_review(
    state: &AppState,
    title_id: TitleId,
    review_id: ReviewId,
) -> YamdbResult<Review> {
    state
        .database
        .review_for_title(title_id, review_id)
        .await?
        .ok_or_else(|| not_found_error!(format!("review {}", review_id)))
}

/// Reviews of a title, newest first
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    tag = "Feedback",
    params(("title_id" = i64, Path, description = "Title id")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<TitleId>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    ensure_title(&state, title_id).await?;
    let reviews = state.database.list_reviews(title_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "No such review on this title", body = ErrorBody)
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(TitleId, ReviewId)>,
) -> ApiResult<Json<ReviewResponse>> {
    Ok(Json(load_review(&state, title_id, review_id).await?.into()))
}

/// Post a review. Each user reviews a title at most once.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    tag = "Feedback",
    params(("title_id" = i64, Path, description = "Title id")),
    request_body = CreateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid fields or review already exists", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    ApiPath(title_id): ApiPath<TitleId>,
    ApiJson(request): ApiJson<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewResponse>)> {
    ensure_title(&state, title_id).await?;
    let (text, score) = request.validate()?;

    let review = state
        .database
        .create_review(title_id, author.id, &text, score)
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

/// Edit a review; author, moderators and administrators only
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    request_body = UpdateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such review on this title", body = ErrorBody)
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    requester: Requester,
    ApiPath((title_id, review_id)): ApiPath<(TitleId, ReviewId)>,
    ApiJson(request): ApiJson<UpdateReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let review = load_review(&state, title_id, review_id).await?;
    requester.authorize_object(Policy::FEEDBACK, MethodClass::Unsafe, &review)?;
    request.validate()?;

    let updated = state
        .database
        .update_review(review.id, request.text.as_deref(), request.score)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    tag = "Feedback",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such review on this title", body = ErrorBody)
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    requester: Requester,
    ApiPath((title_id, review_id)): ApiPath<(TitleId, ReviewId)>,
) -> ApiResult<StatusCode> {
    let review = load_review(&state, title_id, review_id).await?;
    requester.authorize_object(Policy::FEEDBACK, MethodClass::Unsafe, &review)?;

    state.database.delete_review(review.id).await?;
    info!("Deleted review {} on title {}", review.id, title_id);
    Ok(StatusCode::NO_CONTENT)
}
