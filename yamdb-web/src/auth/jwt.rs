//! JWT access tokens

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use yamdb_core::{TokenIssuer, User, UserId, YamdbError, YamdbResult};

/// JWT signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
}

impl Claims {
    /// Claims valid for `ttl_minutes` from now; fails when the expiry is
    /// not representable
    pub fn new_access_token(user: &User, ttl_minutes: i64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(AuthError::TokenCreation)?;
        Ok(Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_type: TokenType::Access,
        })
    }

    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT authentication errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token creation failed")]
    TokenCreation,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Authorization header is not a bearer token")]
    MalformedAuthHeader,
}

impl From<AuthError> for YamdbError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation => YamdbError::internal(err.to_string()),
            _ => YamdbError::Unauthenticated,
        }
    }
}

/// Bearer token from the `Authorization` header; `None` when the header is absent
pub fn bearer_token(headers: &HeaderMap) -> Option<Result<&str, AuthError>> {
    let value = headers.get(AUTHORIZATION)?;
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedAuthHeader);
    Some(token)
}

/// Signs and verifies access tokens with a shared secret
pub struct JwtService {
    keys: Keys,
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").field("ttl_minutes", &self.ttl_minutes).finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            keys: Keys::new(secret.as_bytes()),
            ttl_minutes,
        }
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::new_access_token(user, self.ttl_minutes).inspect_err(|_| {
            warn!("Token lifetime of {} minutes is out of range", self.ttl_minutes);
        })?;
        encode(&Header::default(), &claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode JWT token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Verify and decode token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

impl TokenIssuer for JwtService {
    fn issue(&self, user: &User) -> YamdbResult<String> {
        Ok(self.generate_access_token(user)?)
    }
}
