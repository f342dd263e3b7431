//! Type definitions for handlers
//!
//! Request and response bodies. Responses are built from the core records;
//! requests validate themselves before anything touches storage.

pub mod auth;
pub mod catalog;
pub mod common;
pub mod feedback;
pub mod users;

// Re-export all types for convenience
pub use auth::*;
pub use catalog::*;
pub use common::*;
pub use feedback::*;
pub use users::*;
