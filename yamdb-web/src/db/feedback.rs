//! Reviews and comments

use super::{parse_timestamp, query_error, timestamp, unique_violation, Database};
use chrono::Utc;
use tracing::{debug, info};
use yamdb_core::{
    conflict_error, not_found_error, Comment, CommentId, Review, ReviewId, TitleId, UserId,
    YamdbError, YamdbResult,
};

pub const DUPLICATE_REVIEW: &str = "Your review of this title already exists.";

const REVIEW_SELECT: &str = "SELECT r.id, r.title_id, r.author_id, u.username AS author, \
     r.text, r.score, r.pub_date FROM reviews r JOIN users u ON u.id = r.author_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.review_id, c.author_id, u.username AS author, \
     c.text, c.pub_date FROM comments c JOIN users u ON u.id = c.author_id";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRecord {
    id: i64,
    title_id: i64,
    author_id: i64,
    author: String,
    text: String,
    score: i32,
    pub_date: String,
}

impl TryFrom<ReviewRecord> for Review {
    type Error = YamdbError;

    fn try_from(record: ReviewRecord) -> Result<Self, Self::Error> {
        Ok(Review {
            id: record.id,
            title_id: record.title_id,
            author_id: record.author_id,
            author: record.author,
            text: record.text,
            score: record.score,
            pub_date: parse_timestamp(&record.pub_date)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRecord {
    id: i64,
    review_id: i64,
    author_id: i64,
    author: String,
    text: String,
    pub_date: String,
}

impl TryFrom<CommentRecord> for Comment {
    type Error = YamdbError;

    fn try_from(record: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: record.id,
            review_id: record.review_id,
            author_id: record.author_id,
            author: record.author,
            text: record.text,
            pub_date: parse_timestamp(&record.pub_date)?,
        })
    }
}

fn review_write_error(err: sqlx::Error) -> YamdbError {
    match unique_violation(&err) {
        Some(columns) if columns.iter().any(|c| c.starts_with("reviews.")) => {
            conflict_error!(DUPLICATE_REVIEW)
        }
        _ => query_error("Saving review")(err),
    }
}

impl Database {
    /// Reviews of a title, newest first
    pub async fn list_reviews(&self, title_id: TitleId) -> YamdbResult<Vec<Review>> {
        let sql = format!(
            "{} WHERE r.title_id = ? ORDER BY r.pub_date DESC, r.id DESC",
            REVIEW_SELECT
        );
        let records = sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(title_id)
            .fetch_all(self.pool())
            .await
            .map_err(query_error("Listing reviews"))?;
        records.into_iter().map(Review::try_from).collect()
    }

    pub async fn review_by_id(&self, review_id: ReviewId) -> YamdbResult<Option<Review>> {
        let sql = format!("{} WHERE r.id = ?", REVIEW_SELECT);
        let record = sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(review_id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading review"))?;
        record.map(Review::try_from).transpose()
    }

    /// Review only if it belongs to the given title
    pub async fn review_for_title(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> YamdbResult<Option<Review>> {
        let sql = format!("{} WHERE r.id = ? AND r.title_id = ?", REVIEW_SELECT);
        let record = sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(review_id)
            .bind(title_id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading review"))?;
        record.map(Review::try_from).transpose()
    }

    /// Create a review after checking the author has none on this title yet
    pub async fn create_review(
        &self,
        title_id: TitleId,
        author_id: UserId,
        text: &str,
        score: i32,
    ) -> YamdbResult<Review> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM reviews WHERE title_id = ? AND author_id = ?")
                .bind(title_id)
                .bind(author_id)
                .fetch_optional(self.pool())
                .await
                .map_err(query_error("Checking review"))?;
        if existing.is_some() {
            debug!("User {} already reviewed title {}", author_id, title_id);
            return Err(conflict_error!(DUPLICATE_REVIEW));
        }

        self.insert_review(title_id, author_id, text, score).await
    }

    /// Raw insert; a concurrent duplicate surfaces as the same conflict
    pub(crate) async fn insert_review(
        &self,
        title_id: TitleId,
        author_id: UserId,
        text: &str,
        score: i32,
    ) -> YamdbResult<Review> {
        let result = sqlx::query(
            "INSERT INTO reviews (title_id, author_id, text, score, pub_date) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(text)
        .bind(score)
        .bind(timestamp(Utc::now()))
        .execute(self.pool())
        .await
        .map_err(review_write_error)?;

        let id = result.last_insert_rowid();
        info!("📝 Review {} posted on title {}", id, title_id);
        self.review_by_id(id)
            .await?
            .ok_or_else(|| YamdbError::internal("Review vanished after insert"))
    }

    pub async fn update_review(
        &self,
        review_id: ReviewId,
        text: Option<&str>,
        score: Option<i32>,
    ) -> YamdbResult<Review> {
        sqlx::query(
            "UPDATE reviews SET text = COALESCE(?, text), score = COALESCE(?, score) WHERE id = ?",
        )
        .bind(text)
        .bind(score)
        .bind(review_id)
        .execute(self.pool())
        .await
        .map_err(review_write_error)?;

        self.review_by_id(review_id)
            .await?
            .ok_or_else(|| not_found_error!(format!("review {}", review_id)))
    }

    /// Comments cascade
    pub async fn delete_review(&self, review_id: ReviewId) -> YamdbResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(review_id)
            .execute(self.pool())
            .await
            .map_err(query_error("Deleting review"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Comments on a review, newest first
    pub async fn list_comments(&self, review_id: ReviewId) -> YamdbResult<Vec<Comment>> {
        let sql = format!(
            "{} WHERE c.review_id = ? ORDER BY c.pub_date DESC, c.id DESC",
            COMMENT_SELECT
        );
        let records = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(review_id)
            .fetch_all(self.pool())
            .await
            .map_err(query_error("Listing comments"))?;
        records.into_iter().map(Comment::try_from).collect()
    }

    pub async fn comment_by_id(&self, comment_id: CommentId) -> YamdbResult<Option<Comment>> {
        let sql = format!("{} WHERE c.id = ?", COMMENT_SELECT);
        let record = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(comment_id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading comment"))?;
        record.map(Comment::try_from).transpose()
    }

    /// Comment only if it belongs to the given review
    pub async fn comment_for_review(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> YamdbResult<Option<Comment>> {
        let sql = format!("{} WHERE c.id = ? AND c.review_id = ?", COMMENT_SELECT);
        let record = sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(comment_id)
            .bind(review_id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading comment"))?;
        record.map(Comment::try_from).transpose()
    }

    pub async fn create_comment(
        &self,
        review_id: ReviewId,
        author_id: UserId,
        text: &str,
    ) -> YamdbResult<Comment> {
        let result = sqlx::query(
            "INSERT INTO comments (review_id, author_id, text, pub_date) VALUES (?, ?, ?, ?)",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .bind(timestamp(Utc::now()))
        .execute(self.pool())
        .await
        .map_err(query_error("Inserting comment"))?;

        let id = result.last_insert_rowid();
        info!("💬 Comment {} posted on review {}", id, review_id);
        self.comment_by_id(id)
            .await?
            .ok_or_else(|| YamdbError::internal("Comment vanished after insert"))
    }

    pub async fn update_comment(&self, comment_id: CommentId, text: &str) -> YamdbResult<Comment> {
        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(comment_id)
            .execute(self.pool())
            .await
            .map_err(query_error("Updating comment"))?;

        self.comment_by_id(comment_id)
            .await?
            .ok_or_else(|| not_found_error!(format!("comment {}", comment_id)))
    }

    pub async fn delete_comment(&self, comment_id: CommentId) -> YamdbResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(self.pool())
            .await
            .map_err(query_error("Deleting comment"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yamdb_core::{NewUser, TitleDraft, Taxonomy};

    struct Fixture {
        db: Database,
        alice: UserId,
        bob: UserId,
        title: TitleId,
    }

    async fn fixture() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = db
                .create_user(&NewUser {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    is_active: true,
                    ..NewUser::default()
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        db.create_taxon(Taxonomy::Category, "Films", "films").await.unwrap();
        let title = db
            .create_title(&TitleDraft {
                name: "Heat".to_string(),
                year: 1995,
                category: Some("films".to_string()),
                ..TitleDraft::default()
            })
            .await
            .unwrap();
        Fixture {
            db,
            alice: ids[0],
            bob: ids[1],
            title: title.id,
        }
    }

    #[tokio::test]
    async fn test_second_review_by_same_author_conflicts() {
        let f = fixture().await;
        f.db.create_review(f.title, f.alice, "great", 9).await.unwrap();

        let err = f.db.create_review(f.title, f.alice, "again", 7).await.unwrap_err();
        assert!(matches!(err, YamdbError::Conflict { .. }));
        assert_eq!(err.public_message(), DUPLICATE_REVIEW);
    }

    #[tokio::test]
    async fn test_constraint_backstop_reports_same_conflict() {
        let f = fixture().await;
        f.db.insert_review(f.title, f.alice, "great", 9).await.unwrap();

        // Skips the pre-check, as a concurrent request would
        let err = f.db.insert_review(f.title, f.alice, "again", 7).await.unwrap_err();
        assert!(matches!(err, YamdbError::Conflict { .. }));
        assert_eq!(err.public_message(), DUPLICATE_REVIEW);
        assert_eq!(f.db.list_reviews(f.title).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_is_rounded_mean() {
        let f = fixture().await;
        f.db.create_review(f.title, f.alice, "good", 8).await.unwrap();
        f.db.create_review(f.title, f.bob, "fine", 5).await.unwrap();

        let title = f.db.title_by_id(f.title).await.unwrap().unwrap();
        assert_eq!(title.rating, Some(7));
    }

    #[tokio::test]
    async fn test_reviews_are_newest_first_with_author_names() {
        let f = fixture().await;
        f.db.create_review(f.title, f.alice, "first", 6).await.unwrap();
        f.db.create_review(f.title, f.bob, "second", 4).await.unwrap();

        let reviews = f.db.list_reviews(f.title).await.unwrap();
        assert_eq!(reviews[0].author, "bob");
        assert_eq!(reviews[1].author, "alice");
    }

    #[tokio::test]
    async fn test_review_scoped_to_title() {
        let f = fixture().await;
        let review = f.db.create_review(f.title, f.alice, "ok", 5).await.unwrap();
        assert!(f.db.review_for_title(f.title, review.id).await.unwrap().is_some());
        assert!(f.db.review_for_title(f.title + 1, review.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_review_update() {
        let f = fixture().await;
        let review = f.db.create_review(f.title, f.alice, "ok", 5).await.unwrap();

        let updated = f.db.update_review(review.id, None, Some(8)).await.unwrap();
        assert_eq!(updated.text, "ok");
        assert_eq!(updated.score, 8);
    }

    #[tokio::test]
    async fn test_deleting_title_cascades_to_feedback() {
        let f = fixture().await;
        let review = f.db.create_review(f.title, f.alice, "ok", 5).await.unwrap();
        let comment = f.db.create_comment(review.id, f.bob, "agreed").await.unwrap();

        assert!(f.db.delete_title(f.title).await.unwrap());
        assert!(f.db.review_by_id(review.id).await.unwrap().is_none());
        assert!(f.db.comment_by_id(comment.id).await.unwrap().is_none());
        assert!(f.db.taxon_by_slug(Taxonomy::Category, "films").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_their_feedback() {
        let f = fixture().await;
        let review = f.db.create_review(f.title, f.bob, "meh", 3).await.unwrap();
        f.db.create_comment(review.id, f.alice, "disagree").await.unwrap();

        assert!(f.db.delete_user("alice").await.unwrap());
        assert!(f.db.list_comments(review.id).await.unwrap().is_empty());
        assert!(f.db.review_by_id(review.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_comment_scoped_to_review() {
        let f = fixture().await;
        let review = f.db.create_review(f.title, f.alice, "ok", 5).await.unwrap();
        let comment = f.db.create_comment(review.id, f.bob, "hm").await.unwrap();

        assert_eq!(comment.author, "bob");
        assert!(f.db.comment_for_review(review.id, comment.id).await.unwrap().is_some());
        assert!(f.db.comment_for_review(review.id + 1, comment.id).await.unwrap().is_none());

        let edited = f.db.update_comment(comment.id, "hmm").await.unwrap();
        assert_eq!(edited.text, "hmm");
        assert!(f.db.delete_comment(comment.id).await.unwrap());
        assert!(!f.db.delete_comment(comment.id).await.unwrap());
    }
}
