//! HTTP request handlers
//!
//! Handlers are thin: they extract, validate the body, call storage and
//! shape the response. Collection-level permissions are enforced by the
//! router before a handler runs.

pub mod comments;
pub mod health;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod types;
pub mod users;

pub use comments::*;
pub use health::*;
pub use reviews::*;
pub use taxonomy::*;
pub use titles::*;
pub use users::*;

// Re-export all types for convenience
pub use types::*;
