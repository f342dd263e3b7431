//! YaMDb Core - domain model and access rules
//!
//! Roles, stored records, field validators, authorization predicates and the
//! error taxonomy shared by every layer of the review service.

pub mod error;
pub mod logging;
pub mod permissions;
pub mod role;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::*;
pub use logging::*;
pub use permissions::*;
pub use role::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
