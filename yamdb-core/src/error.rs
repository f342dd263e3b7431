//! Unified error handling
//!
//! Every failure a request can hit maps onto one variant of [`YamdbError`].
//! The web layer translates variants into HTTP statuses; the core never
//! talks about HTTP directly.

use thiserror::Error;
use tracing::{error, warn};

pub type YamdbResult<T> = Result<T, YamdbError>;

/// Main error type for the review service
#[derive(Error, Debug)]
pub enum YamdbError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A uniqueness rule would be broken. Raised both by explicit pre-checks
    /// and by translated storage constraint violations.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl YamdbError {
    /// Default message used when a permission check fails without its own text
    pub const DEFAULT_DENIAL: &'static str =
        "You do not have permission to perform this action.";

    pub fn forbidden(message: Option<&str>) -> Self {
        YamdbError::Forbidden {
            message: message.unwrap_or(Self::DEFAULT_DENIAL).to_string(),
        }
    }

    pub fn storage<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        YamdbError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        YamdbError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Field the error is attached to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            YamdbError::Validation { field, .. } | YamdbError::Conflict { field, .. } => {
                field.as_deref()
            }
            YamdbError::InvalidConfirmationCode => Some("confirmation_code"),
            _ => None,
        }
    }

    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            YamdbError::Validation { .. } => "validation_error",
            YamdbError::Conflict { .. } => "conflict",
            YamdbError::InvalidConfirmationCode => "invalid_confirmation_code",
            YamdbError::Unauthenticated => "not_authenticated",
            YamdbError::Forbidden { .. } => "permission_denied",
            YamdbError::NotFound { .. } => "not_found",
            YamdbError::Storage { .. } => "storage_error",
            YamdbError::Config { .. } => "configuration_error",
            YamdbError::Internal { .. } => "internal_error",
        }
    }

    /// True for failures caused by the request rather than by the server
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            YamdbError::Storage { .. } | YamdbError::Config { .. } | YamdbError::Internal { .. }
        )
    }

    /// Message that is safe to show to a client
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            match self {
                YamdbError::Validation { message, .. }
                | YamdbError::Conflict { message, .. }
                | YamdbError::Forbidden { message } => message.clone(),
                other => other.to_string(),
            }
        } else {
            "Internal server error".to_string()
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        if self.is_client_error() {
            warn!(code = self.code(), error = %self, "Request rejected");
        } else {
            error!(code = self.code(), error = %self, "Server error occurred");
        }
    }
}

/// Convenience macros for creating errors
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::YamdbError::Validation {
            message: $msg.to_string(),
            field: None,
        }
    };
    ($msg:expr, $field:expr) => {
        $crate::YamdbError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
        }
    };
}

#[macro_export]
macro_rules! conflict_error {
    ($msg:expr) => {
        $crate::YamdbError::Conflict {
            message: $msg.to_string(),
            field: None,
        }
    };
    ($msg:expr, $field:expr) => {
        $crate::YamdbError::Conflict {
            message: $msg.to_string(),
            field: Some($field.to_string()),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr) => {
        $crate::YamdbError::NotFound {
            resource: $resource.to_string(),
        }
    };
}
