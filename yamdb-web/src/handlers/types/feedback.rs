//! Review and comment bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use yamdb_core::{
    validation, validation_error, Comment, CommentId, Review, ReviewId, YamdbResult,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub text: String,
    /// Author username
    pub author: String,
    #[schema(minimum = 1, maximum = 10)]
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: review.author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub text: String,
    pub score: Option<i32>,
}

impl CreateReviewRequest {
    /// Validated `(text, score)`
    pub fn validate(self) -> YamdbResult<(String, i32)> {
        validation::validate_text(&self.text)?;
        let score = self
            .score
            .ok_or_else(|| validation_error!("This field is required.", "score"))?;
        validation::validate_score(score)?;
        Ok((self.text, score))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> YamdbResult<()> {
        if let Some(text) = &self.text {
            validation::validate_text(text)?;
        }
        if let Some(score) = self.score {
            validation::validate_score(score)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: CommentId,
    pub text: String,
    /// Author username
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: comment.author,
            pub_date: comment.pub_date,
        }
    }
}

/// Body for both creating and editing a comment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

impl CommentRequest {
    pub fn validate(&self) -> YamdbResult<()> {
        validation::validate_text(&self.text)
    }
}
