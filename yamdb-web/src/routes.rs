//! Route definitions
//!
//! Every surface is grouped with the policy that guards it. The versioned
//! API is nested under `/api/v1` by [`crate::create_app`].

use crate::{
    auth::{self, protect},
    handlers, openapi, AppState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use yamdb_core::Policy;

/// Signup and token exchange; open to everyone
pub fn auth_routes() -> Router<AppState> {
    protect(
        Router::new()
            .route("/auth/signup", post(auth::handlers::signup))
            .route("/auth/token", post(auth::handlers::obtain_token)),
        Policy::ALLOW_ANY,
    )
}

/// Account administration plus the self-service profile
pub fn user_routes() -> Router<AppState> {
    let me = protect(
        Router::new().route(
            "/users/me",
            get(handlers::get_me).patch(handlers::update_me),
        ),
        Policy::SELF_SERVICE,
    );

    let admin = protect(
        Router::new()
            .route(
                "/users",
                get(handlers::list_users).post(handlers::create_user),
            )
            .route(
                "/users/{username}",
                get(handlers::get_user)
                    .patch(handlers::update_user)
                    .delete(handlers::delete_user),
            ),
        Policy::USER_ADMIN,
    );

    me.merge(admin)
}

/// Categories, genres and titles
pub fn catalog_routes() -> Router<AppState> {
    protect(
        Router::new()
            .route(
                "/categories",
                get(handlers::list_categories).post(handlers::create_category),
            )
            .route(
                "/categories/{slug}",
                get(handlers::get_category).delete(handlers::delete_category),
            )
            .route(
                "/genres",
                get(handlers::list_genres).post(handlers::create_genre),
            )
            .route(
                "/genres/{slug}",
                get(handlers::get_genre).delete(handlers::delete_genre),
            )
            .route(
                "/titles",
                get(handlers::list_titles).post(handlers::create_title),
            )
            .route(
                "/titles/{title_id}",
                get(handlers::get_title)
                    .put(handlers::replace_title)
                    .patch(handlers::patch_title)
                    .delete(handlers::delete_title),
            ),
        Policy::CATALOG,
    )
}

/// Reviews and their comments
pub fn feedback_routes() -> Router<AppState> {
    protect(
        Router::new()
            .route(
                "/titles/{title_id}/reviews",
                get(handlers::list_reviews).post(handlers::create_review),
            )
            .route(
                "/titles/{title_id}/reviews/{review_id}",
                get(handlers::get_review)
                    .patch(handlers::update_review)
                    .delete(handlers::delete_review),
            )
            .route(
                "/titles/{title_id}/reviews/{review_id}/comments",
                get(handlers::list_comments).post(handlers::create_comment),
            )
            .route(
                "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
                get(handlers::get_comment)
                    .patch(handlers::update_comment)
                    .delete(handlers::delete_comment),
            ),
        Policy::FEEDBACK,
    )
}

/// Versioned API with bearer authentication in front of every route
pub fn v1_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(feedback_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
}

/// Unversioned service routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
}
