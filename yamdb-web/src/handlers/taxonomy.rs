//! Categories and genres
//!
//! Both taxonomies expose the same list/create/delete surface keyed by slug.

use super::types::{CreateTaxonRequest, SearchQuery, TaxonResponse};
use crate::{
    error::{ApiJson, ApiPath, ApiQuery, ApiResult, ErrorBody},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;
use yamdb_core::{not_found_error, Taxonomy};

async fn list(
    state: &AppState,
    taxonomy: Taxonomy,
    query: SearchQuery,
) -> ApiResult<Json<Vec<TaxonResponse>>> {
    let taxa = state
        .database
        .list_taxa(taxonomy, query.search.as_deref())
        .await?;
    Ok(Json(taxa.into_iter().map(TaxonResponse::from).collect()))
}

async fn retrieve(state: &AppState, taxonomy: Taxonomy, slug: &str) -> ApiResult<Json<TaxonResponse>> {
    let taxon = state
        .database
        .taxon_by_slug(taxonomy, slug)
        .await?
        .ok_or_else(|| not_found_error!(format!("{} {}", taxonomy.label(), slug)))?;
    Ok(Json(taxon.into()))
}

async fn create(
    state: &AppState,
    taxonomy: Taxonomy,
    request: CreateTaxonRequest,
) -> ApiResult<(StatusCode, Json<TaxonResponse>)> {
    request.validate()?;
    let taxon = state
        .database
        .create_taxon(taxonomy, &request.name, &request.slug)
        .await?;
    Ok((StatusCode::CREATED, Json(taxon.into())))
}

async fn destroy(state: &AppState, taxonomy: Taxonomy, slug: &str) -> ApiResult<StatusCode> {
    if !state.database.delete_taxon(taxonomy, slug).await? {
        return Err(not_found_error!(format!("{} {}", taxonomy.label(), slug)).into());
    }
    info!("Deleted {} {}", taxonomy.label(), slug);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Catalog",
    params(SearchQuery),
    responses((status = 200, description = "Categories ordered by name", body = [TaxonResponse]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<TaxonResponse>>> {
    list(&state, Taxonomy::Category, query).await
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category", body = TaxonResponse),
        (status = 404, description = "No such category", body = ErrorBody)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<TaxonResponse>> {
    retrieve(&state, Taxonomy::Category, &slug).await
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Catalog",
    request_body = CreateTaxonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = TaxonResponse),
        (status = 400, description = "Invalid or duplicate name or slug", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaxonRequest>,
) -> ApiResult<(StatusCode, Json<TaxonResponse>)> {
    create(&state, Taxonomy::Category, request).await
}

/// Titles in the category keep existing with no category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Category slug")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such category", body = ErrorBody)
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<StatusCode> {
    destroy(&state, Taxonomy::Category, &slug).await
}

#[utoipa::path(
    get,
    path = "/api/v1/genres",
    tag = "Catalog",
    params(SearchQuery),
    responses((status = 200, description = "Genres ordered by name", body = [TaxonResponse]))
)]
pub async fn list_genres(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<TaxonResponse>>> {
    list(&state, Taxonomy::Genre, query).await
}

#[utoipa::path(
    get,
    path = "/api/v1/genres/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 200, description = "Genre", body = TaxonResponse),
        (status = 404, description = "No such genre", body = ErrorBody)
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<TaxonResponse>> {
    retrieve(&state, Taxonomy::Genre, &slug).await
}

#[utoipa::path(
    post,
    path = "/api/v1/genres",
    tag = "Catalog",
    request_body = CreateTaxonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Genre created", body = TaxonResponse),
        (status = 400, description = "Invalid or duplicate name or slug", body = ErrorBody),
        (status = 403, description = "Administrators only", body = ErrorBody)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaxonRequest>,
) -> ApiResult<(StatusCode, Json<TaxonResponse>)> {
    create(&state, Taxonomy::Genre, request).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    tag = "Catalog",
    params(("slug" = String, Path, description = "Genre slug")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such genre", body = ErrorBody)
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<StatusCode> {
    destroy(&state, Taxonomy::Genre, &slug).await
}
