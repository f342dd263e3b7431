//! OpenAPI document for the review service

use axum::response::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use yamdb_core::Role;

use crate::{
    error::ErrorBody,
    handlers::{
        CommentRequest, CommentResponse, CreateReviewRequest, CreateTaxonRequest,
        CreateUserRequest, HealthResponse, ReviewResponse, SignupRequest, TaxonResponse,
        TitlePatchRequest, TitleRequest, TitleResponse, TokenRequest, TokenResponse,
        UpdateReviewRequest, UpdateUserRequest, UserResponse,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "YaMDb API",
        version = "0.1.0",
        description = "Reviews and ratings for films, books and music",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,

        crate::auth::handlers::signup,
        crate::auth::handlers::obtain_token,

        crate::handlers::list_users,
        crate::handlers::create_user,
        crate::handlers::get_user,
        crate::handlers::update_user,
        crate::handlers::delete_user,
        crate::handlers::get_me,
        crate::handlers::update_me,

        crate::handlers::list_categories,
        crate::handlers::get_category,
        crate::handlers::create_category,
        crate::handlers::delete_category,
        crate::handlers::list_genres,
        crate::handlers::get_genre,
        crate::handlers::create_genre,
        crate::handlers::delete_genre,

        crate::handlers::list_titles,
        crate::handlers::get_title,
        crate::handlers::create_title,
        crate::handlers::replace_title,
        crate::handlers::patch_title,
        crate::handlers::delete_title,

        crate::handlers::list_reviews,
        crate::handlers::get_review,
        crate::handlers::create_review,
        crate::handlers::update_review,
        crate::handlers::delete_review,
        crate::handlers::list_comments,
        crate::handlers::get_comment,
        crate::handlers::create_comment,
        crate::handlers::update_comment,
        crate::handlers::delete_comment,
    ),
    components(
        schemas(
            ErrorBody,
            HealthResponse,
            SignupRequest,
            TokenRequest,
            TokenResponse,
            Role,
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            TaxonResponse,
            CreateTaxonRequest,
            TitleResponse,
            TitleRequest,
            TitlePatchRequest,
            ReviewResponse,
            CreateReviewRequest,
            UpdateReviewRequest,
            CommentResponse,
            CommentRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Signup and access tokens"),
        (name = "Users", description = "Accounts and profiles"),
        (name = "Catalog", description = "Categories, genres and titles"),
        (name = "Feedback", description = "Reviews and comments"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer JWT security scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "YaMDb API");
        assert!(openapi.paths.paths.contains_key("/api/v1/auth/signup"));
        assert!(openapi
            .paths
            .paths
            .contains_key("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}"));
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("bearer_auth"));
        assert!(json.contains("JWT"));
    }
}
