//! Account bodies

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use yamdb_core::{validation, NewUser, Role, User, UserChanges, YamdbResult};

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "critic")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

/// Administrator-created account
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    /// Defaults to `user`
    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> YamdbResult<NewUser> {
        validation::validate_username(&self.username)?;
        validation::validate_email(&self.email)?;
        validation::validate_person_name(&self.first_name, "first_name")?;
        validation::validate_person_name(&self.last_name, "last_name")?;
        validation::validate_bio(&self.bio)?;

        Ok(NewUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role.unwrap_or_default(),
            is_active: true,
            ..NewUser::default()
        })
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> YamdbResult<UserChanges> {
        if let Some(username) = &self.username {
            validation::validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validation::validate_email(email)?;
        }
        if let Some(first_name) = &self.first_name {
            validation::validate_person_name(first_name, "first_name")?;
        }
        if let Some(last_name) = &self.last_name {
            validation::validate_person_name(last_name, "last_name")?;
        }
        if let Some(bio) = &self.bio {
            validation::validate_bio(bio)?;
        }

        Ok(UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        })
    }
}
