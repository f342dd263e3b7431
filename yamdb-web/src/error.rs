//! HTTP mapping of domain errors and extractor rejections

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use yamdb_core::{not_found_error, validation_error, YamdbError};

/// Body returned for every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub error: String,
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Domain error on its way out as a response
#[derive(Debug)]
pub struct ApiError(pub YamdbError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<YamdbError> for ApiError {
    fn from(err: YamdbError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            YamdbError::Validation { .. }
            | YamdbError::Conflict { .. }
            | YamdbError::InvalidConfirmationCode => StatusCode::BAD_REQUEST,
            YamdbError::Unauthenticated => StatusCode::UNAUTHORIZED,
            YamdbError::Forbidden { .. } => StatusCode::FORBIDDEN,
            YamdbError::NotFound { .. } => StatusCode::NOT_FOUND,
            YamdbError::Storage { .. } | YamdbError::Config { .. } | YamdbError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let message = self.0.public_message();
        let fields = self
            .0
            .field()
            .map(|field| BTreeMap::from([(field.to_string(), vec![message.clone()])]));
        ErrorBody {
            error: self.0.code().to_string(),
            message,
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(validation_error!(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(validation_error!(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(not_found_error!(rejection.body_text()))
    }
}

/// JSON body extractor whose rejection uses [`ErrorBody`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejection uses [`ErrorBody`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor; unparsable segments are reported as missing resources
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
