//! Permission System
//!
//! Composable predicates evaluated per request. A [`Policy`] ANDs its
//! predicates together; collection-level checks run before any object is
//! loaded, object-level checks only once the target object exists.

use crate::error::{YamdbError, YamdbResult};
use crate::types::{Authored, Principal};
use tracing::warn;

/// HTTP method names that never mutate state
pub const SAFE_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Whether the request only reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Safe,
    Unsafe,
}

impl MethodClass {
    pub fn from_method(method: &str) -> Self {
        if SAFE_METHODS.contains(&method) {
            MethodClass::Safe
        } else {
            MethodClass::Unsafe
        }
    }

    pub fn is_safe(self) -> bool {
        self == MethodClass::Safe
    }
}

/// Single authorization rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    IsAuthenticated,
    AuthenticatedOrReadOnly,
    AdminOrSuperuserForUsers,
    AdminOrSuperuser,
    AdminOrModeratorOrAuthor,
}

fn is_admin_or_superuser(principal: &Principal) -> bool {
    principal.role.is_admin() || principal.is_superuser
}

impl Predicate {
    /// Collection-level check
    pub fn has_permission(self, requester: Option<&Principal>, method: MethodClass) -> bool {
        match self {
            Predicate::IsAuthenticated => requester.is_some(),
            Predicate::AuthenticatedOrReadOnly => method.is_safe() || requester.is_some(),
            Predicate::AdminOrSuperuserForUsers => requester.is_some_and(is_admin_or_superuser),
            Predicate::AdminOrSuperuser => {
                method.is_safe() || requester.is_some_and(is_admin_or_superuser)
            }
            Predicate::AdminOrModeratorOrAuthor => true,
        }
    }

    /// Object-level check; only the author predicate looks at the object
    pub fn has_object_permission(
        self,
        requester: Option<&Principal>,
        method: MethodClass,
        object: &dyn Authored,
    ) -> bool {
        match self {
            Predicate::AdminOrModeratorOrAuthor => {
                method.is_safe()
                    || requester.is_some_and(|p| {
                        p.role.at_least(crate::Role::Moderator) || p.id == object.author_id()
                    })
            }
            _ => true,
        }
    }

    /// Human-readable reason returned on denial
    pub fn denial_message(self) -> Option<&'static str> {
        match self {
            Predicate::AdminOrModeratorOrAuthor => {
                Some("Changing other users' content is forbidden.")
            }
            _ => None,
        }
    }
}

/// Ordered AND-combination of predicates attached to one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub name: &'static str,
    pub predicates: &'static [Predicate],
}

impl Policy {
    pub const ALLOW_ANY: Policy = Policy {
        name: "allow_any",
        predicates: &[],
    };

    pub const SELF_SERVICE: Policy = Policy {
        name: "self_service",
        predicates: &[Predicate::IsAuthenticated],
    };

    pub const USER_ADMIN: Policy = Policy {
        name: "user_admin",
        predicates: &[
            Predicate::IsAuthenticated,
            Predicate::AdminOrSuperuserForUsers,
        ],
    };

    pub const CATALOG: Policy = Policy {
        name: "catalog",
        predicates: &[
            Predicate::AuthenticatedOrReadOnly,
            Predicate::AdminOrSuperuser,
        ],
    };

    pub const FEEDBACK: Policy = Policy {
        name: "feedback",
        predicates: &[
            Predicate::AuthenticatedOrReadOnly,
            Predicate::AdminOrModeratorOrAuthor,
        ],
    };

    /// Run every collection-level predicate
    pub fn authorize(&self, requester: Option<&Principal>, method: MethodClass) -> YamdbResult<()> {
        for predicate in self.predicates {
            if !predicate.has_permission(requester, method) {
                return Err(self.deny(*predicate, requester));
            }
        }
        Ok(())
    }

    /// Run every object-level predicate against an existing object
    pub fn authorize_object(
        &self,
        requester: Option<&Principal>,
        method: MethodClass,
        object: &dyn Authored,
    ) -> YamdbResult<()> {
        for predicate in self.predicates {
            if !predicate.has_object_permission(requester, method, object) {
                return Err(self.deny(*predicate, requester));
            }
        }
        Ok(())
    }

    fn deny(&self, predicate: Predicate, requester: Option<&Principal>) -> YamdbError {
        match requester {
            None => {
                warn!(policy = self.name, ?predicate, "Anonymous request denied");
                YamdbError::Unauthenticated
            }
            Some(principal) => {
                warn!(
                    policy = self.name,
                    ?predicate,
                    user_id = principal.id,
                    role = %principal.role,
                    "Request denied"
                );
                YamdbError::forbidden(predicate.denial_message())
            }
        }
    }
}
