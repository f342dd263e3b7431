//! Field validators shared by every write path

use crate::error::YamdbResult;
use crate::validation_error;
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_REVIEW_SCORE: i32 = 1;
pub const MAX_REVIEW_SCORE: i32 = 10;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const BIO_MAX_LEN: usize = 1000;
pub const TAXON_NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const TITLE_NAME_MAX_LEN: usize = 256;

/// Reserved for the self-service profile route
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug pattern"));

fn require_non_blank(value: &str, field: &str) -> YamdbResult<()> {
    if value.trim().is_empty() {
        return Err(validation_error!("This field may not be blank.", field));
    }
    Ok(())
}

fn require_max_len(value: &str, max: usize, field: &str) -> YamdbResult<()> {
    if value.chars().count() > max {
        return Err(validation_error!(
            format!("Ensure this field has no more than {} characters.", max),
            field
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> YamdbResult<()> {
    require_non_blank(username, "username")?;
    require_max_len(username, USERNAME_MAX_LEN, "username")?;
    if username == RESERVED_USERNAME {
        return Err(validation_error!(
            "\"me\" cannot be used as a username",
            "username"
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(validation_error!(
            "Username may contain only letters, digits and @/./+/-/_ characters.",
            "username"
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> YamdbResult<()> {
    require_non_blank(email, "email")?;
    require_max_len(email, EMAIL_MAX_LEN, "email")?;

    let invalid = || validation_error!("Enter a valid email address.", "email");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_person_name(value: &str, field: &str) -> YamdbResult<()> {
    require_max_len(value, PERSON_NAME_MAX_LEN, field)
}

pub fn validate_bio(bio: &str) -> YamdbResult<()> {
    require_max_len(bio, BIO_MAX_LEN, "bio")
}

pub fn validate_taxon_name(name: &str) -> YamdbResult<()> {
    require_non_blank(name, "name")?;
    require_max_len(name, TAXON_NAME_MAX_LEN, "name")
}

pub fn validate_slug(slug: &str) -> YamdbResult<()> {
    require_non_blank(slug, "slug")?;
    require_max_len(slug, SLUG_MAX_LEN, "slug")?;
    if !SLUG_RE.is_match(slug) {
        return Err(validation_error!(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            "slug"
        ));
    }
    Ok(())
}

pub fn validate_title_name(name: &str) -> YamdbResult<()> {
    require_non_blank(name, "name")?;
    require_max_len(name, TITLE_NAME_MAX_LEN, "name")
}

/// Year of release may not lie in the future relative to `current_year`
pub fn validate_year_against(year: i32, current_year: i32) -> YamdbResult<()> {
    if year > current_year {
        return Err(validation_error!(
            format!("Year {} is later than the current year {}", year, current_year),
            "year"
        ));
    }
    Ok(())
}

/// Year check against today's date (UTC)
pub fn validate_year(year: i32) -> YamdbResult<()> {
    validate_year_against(year, chrono::Utc::now().year())
}

pub fn validate_score(score: i32) -> YamdbResult<()> {
    if !(MIN_REVIEW_SCORE..=MAX_REVIEW_SCORE).contains(&score) {
        return Err(validation_error!(
            format!(
                "Score must be between {} and {}",
                MIN_REVIEW_SCORE, MAX_REVIEW_SCORE
            ),
            "score"
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> YamdbResult<()> {
    require_non_blank(text, "text")
}

/// Fresh confirmation code backed by a v4 UUID from the OS random source
pub fn new_confirmation_code() -> String {
    uuid::Uuid::new_v4().to_string()
}
