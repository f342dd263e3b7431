//! SQLite persistence
//!
//! One [`Database`] handle wraps the connection pool. Entity queries are
//! split by area: accounts, catalog (categories, genres, titles) and
//! feedback (reviews, comments). Foreign-key delete policies are declared in
//! the schema so cascades happen inside SQLite.

mod catalog;
mod feedback;
mod users;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, error, info};
use yamdb_core::{YamdbError, YamdbResult};

/// Schema statements, applied in order at startup
const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'user'
                CHECK (role IN ('user', 'moderator', 'admin')),
            confirmation_code TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 0,
            is_superuser INTEGER NOT NULL DEFAULT 0,
            date_joined TEXT NOT NULL
        )
        "#,
    ),
    (
        "categories",
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "genres",
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "titles",
        r#"
        CREATE TABLE IF NOT EXISTS titles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            year INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "genre_title",
        r#"
        CREATE TABLE IF NOT EXISTS genre_title (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
            title_id INTEGER NOT NULL REFERENCES titles(id) ON DELETE CASCADE,
            UNIQUE (genre_id, title_id)
        )
        "#,
    ),
    (
        "reviews",
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title_id INTEGER NOT NULL REFERENCES titles(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 10),
            pub_date TEXT NOT NULL,
            CONSTRAINT unique_review UNIQUE (title_id, author_id)
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            review_id INTEGER NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            pub_date TEXT NOT NULL
        )
        "#,
    ),
    (
        "indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_titles_category ON titles(category_id);
        CREATE INDEX IF NOT EXISTS idx_genre_title_title ON genre_title(title_id);
        CREATE INDEX IF NOT EXISTS idx_reviews_title ON reviews(title_id, pub_date);
        CREATE INDEX IF NOT EXISTS idx_comments_review ON comments(review_id, pub_date)
        "#,
    ),
];

/// Durable store shared by every request
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str) -> YamdbResult<Self> {
        info!("🔗 Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| YamdbError::storage(format!("Invalid database URL {}", database_url), e))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory URL opens a fresh database, so the
        // pool is pinned to one connection that never expires.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            error!("❌ Database connection failed: {}", e);
            YamdbError::storage("Failed to connect to database", e)
        })?;

        let database = Self { pool };
        database.create_tables().await?;
        info!("✅ Database ready");
        Ok(database)
    }

    async fn create_tables(&self) -> YamdbResult<()> {
        for (name, statement) in SCHEMA {
            debug!("📋 Applying schema: {}", name);
            sqlx::raw_sql(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("❌ Failed to apply schema {}: {}", name, e);
                    YamdbError::storage(format!("Failed to apply schema {}", name), e)
                })?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight queries
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that text
/// ordering matches chronological ordering.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> YamdbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| YamdbError::storage(format!("Corrupt timestamp {:?}", value), e))
}

/// Columns named by a UNIQUE violation, e.g. `["users.email"]`
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<Vec<String>> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let message = db_err.message();
            let columns = message
                .split_once(':')
                .map(|(_, cols)| cols.split(',').map(|c| c.trim().to_string()).collect())
                .unwrap_or_default();
            Some(columns)
        }
        _ => None,
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped
pub(crate) fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Generic wrapper for failed queries
pub(crate) fn query_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> YamdbError {
    move |e| {
        error!("❌ {} failed: {}", operation, e);
        YamdbError::storage(format!("{} failed", operation), e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_keeps_schema() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('users', 'categories', 'genres', 'titles', 'genre_title', 'reviews', 'comments')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yamdb.sqlite3");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.unwrap();
        db.close().await;
        assert!(path.exists());

        // Reconnecting must not fail on the existing schema
        Database::connect(&url).await.unwrap();
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("sci"), "%sci%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let early = Utc::now();
        let late = early + chrono::Duration::milliseconds(1);
        assert!(timestamp(early) < timestamp(late));
        assert_eq!(parse_timestamp(&timestamp(early)).unwrap().timestamp_micros(), early.timestamp_micros());
    }
}
