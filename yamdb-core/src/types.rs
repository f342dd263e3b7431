//! Core domain records
//!
//! These are the stored shapes of every entity. API-facing request and
//! response bodies live in the web crate and are built from these.

use crate::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TitleId = i64;
pub type ReviewId = i64;
pub type CommentId = i64;

/// Registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    /// Blank until signup issues a code
    #[serde(skip_serializing)]
    pub confirmation_code: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Identity used for authorization decisions
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            is_superuser: self.is_superuser,
        }
    }

    /// Exact match against the stored code. A blank stored code never matches.
    pub fn confirmation_code_matches(&self, code: &str) -> bool {
        !self.confirmation_code.is_empty() && self.confirmation_code == code
    }
}

/// The parts of a user that authorization looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub is_superuser: bool,
}

/// Fields an administrator (or signup) supplies for a new account
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub confirmation_code: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Partial profile update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Category or genre; both share the same shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// The two slug-keyed taxonomies attached to titles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Category,
    Genre,
}

impl Taxonomy {
    /// Singular name used in messages
    pub fn label(self) -> &'static str {
        match self {
            Taxonomy::Category => "category",
            Taxonomy::Genre => "genre",
        }
    }
}

/// Title with its category and genres resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category: Option<Taxon>,
    pub genres: Vec<Taxon>,
    /// Mean review score rounded to the nearest integer
    pub rating: Option<i32>,
}

/// Write shape of a title; taxonomies are referenced by slug
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitleDraft {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category: Option<String>,
    pub genres: Vec<String>,
}

/// Title list filter. Only one dimension is ever applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TitleFilter {
    #[default]
    All,
    Category(String),
    Genre(String),
    Year(i32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub author_id: UserId,
    pub author: String,
    pub text: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

/// Objects with an owning author, checked by object-level permissions
pub trait Authored {
    fn author_id(&self) -> UserId;
}

impl Authored for Review {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}
