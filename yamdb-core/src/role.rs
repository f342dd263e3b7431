//! User roles and their privilege order

use serde::{Deserialize, Serialize};

/// Role assigned to every account.
///
/// Variants are declared from least to most privileged, so the derived
/// ordering matches the privilege order: `User < Moderator < Admin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    /// All roles, least privileged first
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    /// Numeric privilege rank
    pub fn privilege(self) -> u8 {
        match self {
            Role::User => 0,
            Role::Moderator => 1,
            Role::Admin => 2,
        }
    }

    /// True when this role is at least as privileged as `other`
    pub fn at_least(self, other: Role) -> bool {
        self.privilege() >= other.privilege()
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_moderator(self) -> bool {
        self == Role::Moderator
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("\"{}\" is not a valid role", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order() {
        assert!(Role::Admin > Role::Moderator);
        assert!(Role::Moderator > Role::User);
        assert!(Role::Admin.at_least(Role::Moderator));
        assert!(Role::Moderator.at_least(Role::Moderator));
        assert!(!Role::User.at_least(Role::Moderator));
    }

    #[test]
    fn test_round_trip_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"moderator\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(Role::default(), Role::User);
    }
}
