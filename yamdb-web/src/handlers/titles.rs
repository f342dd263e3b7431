//! Titles

use super::types::{TitleFilterQuery, TitlePatchRequest, TitleRequest, TitleResponse};
use crate::{
    error::{ApiJson, ApiPath, ApiQuery, ApiResult, ErrorBody},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;
use yamdb_core::{not_found_error, Title, TitleId, YamdbResult};

pub(crate) async fn load_title(state: &AppState, id: TitleId) -> YamdbResult<Title> {
    state
        .database
        .title_by_id(id)
        .await?
        .ok_or_else(|| not_found_error!(format!("title {}", id)))
}

/// List titles, optionally filtered by one dimension
///
/// When several filters are given only the first of category, genre, year,
/// name is applied.
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    tag = "Catalog",
    params(TitleFilterQuery),
    responses(
        (status = 200, description = "Titles ordered by id", body = [TitleResponse]),
        (status = 400, description = "Year is not a whole number", body = ErrorBody)
    )
)]
pub async fn list_titles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TitleFilterQuery>,
) -> ApiResult<Json<Vec<TitleResponse>>> {
    let filter = query.into_filter()?;
    let titles = state.database.list_titles(&filter).await?;
    Ok(Json(titles.into_iter().map(TitleResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    tag = "Catalog",
    params(("title_id" = i64, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title", body = TitleResponse),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn get_title(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TitleId>,
) -> ApiResult<Json<TitleResponse>> {
    Ok(Json(load_title(&state, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/titles",
    tag = "Catalog",
    request_body = TitleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Title created", body = TitleResponse),
        (status = 400, description = "Invalid fields or unknown slug", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    )
)]
pub async fn create_title(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TitleRequest>,
) -> ApiResult<(StatusCode, Json<TitleResponse>)> {
    let draft = request.into_draft()?;
    let title = state.database.create_title(&draft).await?;
    Ok((StatusCode::CREATED, Json(title.into())))
}

/// Replace a title
#[utoipa::path(
    put,
    path = "/api/v1/titles/{title_id}",
    tag = "Catalog",
    params(("title_id" = i64, Path, description = "Title id")),
    request_body = TitleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stored title", body = TitleResponse),
        (status = 400, description = "Invalid fields or unknown slug", body = ErrorBody),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn replace_title(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TitleId>,
    ApiJson(request): ApiJson<TitleRequest>,
) -> ApiResult<Json<TitleResponse>> {
    load_title(&state, id).await?;
    let draft = request.into_draft()?;
    let title = state.database.update_title(id, &draft).await?;
    Ok(Json(title.into()))
}

/// Update some fields of a title
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    tag = "Catalog",
    params(("title_id" = i64, Path, description = "Title id")),
    request_body = TitlePatchRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stored title", body = TitleResponse),
        (status = 400, description = "Invalid fields or unknown slug", body = ErrorBody),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn patch_title(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TitleId>,
    ApiJson(request): ApiJson<TitlePatchRequest>,
) -> ApiResult<Json<TitleResponse>> {
    let current = load_title(&state, id).await?;
    let draft = request.apply(&current)?;
    let title = state.database.update_title(id, &draft).await?;
    Ok(Json(title.into()))
}

/// Delete a title with its reviews and their comments
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    tag = "Catalog",
    params(("title_id" = i64, Path, description = "Title id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such title", body = ErrorBody)
    )
)]
pub async fn delete_title(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TitleId>,
) -> ApiResult<StatusCode> {
    if !state.database.delete_title(id).await? {
        return Err(not_found_error!(format!("title {}", id)).into());
    }
    info!("Deleted title {}", id);
    Ok(StatusCode::NO_CONTENT)
}
