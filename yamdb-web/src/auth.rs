//! Authentication and authorization
//!
//! [`authenticate`] runs once per API request and stores a [`Requester`] in
//! the request extensions. Routers then attach a [`Policy`] with [`protect`],
//! which runs the collection-level predicates before any handler. Handlers
//! that load a single review or comment run the object-level predicates
//! themselves.

pub mod handlers;
pub mod jwt;
pub mod mailer;
pub mod users;

use crate::{error::ApiError, AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::convert::Infallible;
use tracing::debug;
use yamdb_core::{Authored, MethodClass, Policy, Principal, User, YamdbError, YamdbResult};

/// Identity resolved for the current request; `None` for anonymous callers
#[derive(Debug, Clone, Default)]
pub struct Requester(pub Option<User>);

impl Requester {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.0.as_ref().map(User::principal)
    }

    /// Object-level check for the request method
    pub fn authorize_object(
        &self,
        policy: Policy,
        method: MethodClass,
        object: &dyn Authored,
    ) -> YamdbResult<()> {
        policy.authorize_object(self.principal().as_ref(), method, object)
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Requester>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Authenticated user extractor; anonymous requests are rejected
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Requester>()
            .and_then(|requester| requester.0.clone())
            .map(AuthUser)
            .ok_or(ApiError(YamdbError::Unauthenticated))
    }
}

async fn resolve_user(state: &AppState, token: &str) -> YamdbResult<User> {
    let claims = state.tokens.verify_token(token)?;
    let user = state.database.user_by_id(claims.user_id()?).await?;
    match user {
        Some(user) if user.is_active => Ok(user),
        Some(_) => {
            debug!("Token presented for inactive user {}", claims.sub);
            Err(YamdbError::Unauthenticated)
        }
        None => {
            debug!("Token presented for unknown user {}", claims.sub);
            Err(YamdbError::Unauthenticated)
        }
    }
}

/// Resolve the bearer token, if any. A token that is present but invalid
/// fails the request even on open routes.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match jwt::bearer_token(request.headers()) {
        None => None,
        Some(token) => {
            let token = token.map_err(YamdbError::from)?;
            Some(resolve_user(&state, token).await?)
        }
    };

    request.extensions_mut().insert(Requester(user));
    Ok(next.run(request).await)
}

/// Collection-level policy check
pub async fn enforce_policy(
    policy: Policy,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Requester>()
        .and_then(Requester::principal);
    let method = MethodClass::from_method(request.method().as_str());

    policy.authorize(principal.as_ref(), method)?;
    Ok(next.run(request).await)
}

/// Attach a policy to every route of `router`
pub fn protect(router: Router<AppState>, policy: Policy) -> Router<AppState> {
    router.route_layer(middleware::from_fn(move |request: Request, next: Next| {
        enforce_policy(policy, request, next)
    }))
}
