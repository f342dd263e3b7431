//! Account storage

use super::{contains_pattern, parse_timestamp, query_error, timestamp, unique_violation, Database};
use chrono::Utc;
use tracing::{debug, info};
use yamdb_core::{conflict_error, NewUser, Role, User, UserChanges, UserId, YamdbError, YamdbResult};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, role, \
                            confirmation_code, is_active, is_superuser, date_joined";

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    bio: String,
    role: String,
    confirmation_code: String,
    is_active: bool,
    is_superuser: bool,
    date_joined: String,
}

impl TryFrom<UserRecord> for User {
    type Error = YamdbError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = record
            .role
            .parse::<Role>()
            .map_err(|e| YamdbError::internal(format!("Stored user {}: {}", record.id, e)))?;

        Ok(User {
            id: record.id,
            username: record.username,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            bio: record.bio,
            role,
            confirmation_code: record.confirmation_code,
            is_active: record.is_active,
            is_superuser: record.is_superuser,
            date_joined: parse_timestamp(&record.date_joined)?,
        })
    }
}

/// Translate UNIQUE violations on `users` into field conflicts
fn user_write_error(err: sqlx::Error) -> YamdbError {
    match unique_violation(&err) {
        Some(columns) if columns.iter().any(|c| c == "users.username") => {
            conflict_error!("A user with that username already exists.", "username")
        }
        Some(columns) if columns.iter().any(|c| c == "users.email") => {
            conflict_error!("A user with that email already exists.", "email")
        }
        _ => query_error("Saving user")(err),
    }
}

impl Database {
    async fn fetch_user(&self, clause: &str, value: &str) -> YamdbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, clause);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading user"))?;
        record.map(User::try_from).transpose()
    }

    pub async fn user_by_id(&self, id: UserId) -> YamdbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading user"))?;
        record.map(User::try_from).transpose()
    }

    pub async fn user_by_username(&self, username: &str) -> YamdbResult<Option<User>> {
        self.fetch_user("username", username).await
    }

    pub async fn user_by_email(&self, email: &str) -> YamdbResult<Option<User>> {
        self.fetch_user("email", email).await
    }

    /// Account matching both fields exactly
    pub async fn user_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> YamdbResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ? AND email = ?",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(query_error("Loading user"))?;
        record.map(User::try_from).transpose()
    }

    /// Users ordered by username, optionally filtered by a username substring
    pub async fn list_users(&self, search: Option<&str>) -> YamdbResult<Vec<User>> {
        let records = match search.filter(|s| !s.is_empty()) {
            Some(needle) => {
                let sql = format!(
                    "SELECT {} FROM users WHERE username LIKE ? ESCAPE '\\' ORDER BY username",
                    USER_COLUMNS
                );
                sqlx::query_as::<_, UserRecord>(&sql)
                    .bind(contains_pattern(needle))
                    .fetch_all(self.pool())
                    .await
            }
            None => {
                let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
                sqlx::query_as::<_, UserRecord>(&sql)
                    .fetch_all(self.pool())
                    .await
            }
        }
        .map_err(query_error("Listing users"))?;

        records.into_iter().map(User::try_from).collect()
    }

    pub async fn create_user(&self, new_user: &NewUser) -> YamdbResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, first_name, last_name, bio, role, \
             confirmation_code, is_active, is_superuser, date_joined) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.bio)
        .bind(new_user.role.as_str())
        .bind(&new_user.confirmation_code)
        .bind(new_user.is_active)
        .bind(new_user.is_superuser)
        .bind(timestamp(Utc::now()))
        .execute(self.pool())
        .await
        .map_err(user_write_error)?;

        let id = result.last_insert_rowid();
        info!("👤 Created user {} (id {})", new_user.username, id);
        self.user_by_id(id)
            .await?
            .ok_or_else(|| YamdbError::internal("User vanished after insert"))
    }

    /// Apply a partial update and return the stored row
    pub async fn update_user(&self, id: UserId, changes: &UserChanges) -> YamdbResult<User> {
        sqlx::query(
            "UPDATE users SET \
             username = COALESCE(?, username), \
             email = COALESCE(?, email), \
             first_name = COALESCE(?, first_name), \
             last_name = COALESCE(?, last_name), \
             bio = COALESCE(?, bio), \
             role = COALESCE(?, role) \
             WHERE id = ?",
        )
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.bio.as_deref())
        .bind(changes.role.map(Role::as_str))
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(user_write_error)?;

        debug!("Updated user {}", id);
        self.user_by_id(id)
            .await?
            .ok_or_else(|| yamdb_core::not_found_error!(format!("user {}", id)))
    }

    /// Hard delete; reviews and comments by the user cascade
    pub async fn delete_user(&self, username: &str) -> YamdbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(self.pool())
            .await
            .map_err(query_error("Deleting user"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_confirmation_code(&self, id: UserId, code: &str) -> YamdbResult<()> {
        sqlx::query("UPDATE users SET confirmation_code = ? WHERE id = ?")
            .bind(code)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(query_error("Storing confirmation code"))?;
        Ok(())
    }

    pub async fn activate_user(&self, id: UserId) -> YamdbResult<()> {
        sqlx::query("UPDATE users SET is_active = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(query_error("Activating user"))?;
        Ok(())
    }

    /// Make sure an administrator account with these credentials exists.
    ///
    /// Only the exact (username, email) pair is promoted. An account holding
    /// the username under another email is left alone and reported.
    pub async fn ensure_superuser(&self, username: &str, email: &str) -> YamdbResult<User> {
        if let Some(existing) = self.user_by_username_and_email(username, email).await? {
            sqlx::query(
                "UPDATE users SET role = 'admin', is_superuser = 1, is_active = 1 WHERE id = ?",
            )
            .bind(existing.id)
            .execute(self.pool())
            .await
            .map_err(query_error("Promoting superuser"))?;
            debug!("Superuser {} already exists", username);
            return self
                .user_by_id(existing.id)
                .await?
                .ok_or_else(|| YamdbError::internal("Superuser vanished after update"));
        }

        if self.user_by_username(username).await?.is_some() {
            return Err(conflict_error!(
                format!(
                    "User {} exists with a different email; refusing to promote it",
                    username
                ),
                "username"
            ));
        }

        let admin = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            is_active: true,
            is_superuser: true,
            ..NewUser::default()
        };
        self.create_user(&admin).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            is_active: true,
            ..NewUser::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_load_user() {
        let db = db().await;
        let user = db.create_user(&new_user("alice", "alice@example.com")).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert_eq!(db.user_by_username("alice").await.unwrap(), Some(user.clone()));
        assert_eq!(db.user_by_email("alice@example.com").await.unwrap(), Some(user));
        assert!(db.user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_columns_become_conflicts() {
        let db = db().await;
        db.create_user(&new_user("alice", "alice@example.com")).await.unwrap();

        let err = db
            .create_user(&new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, YamdbError::Conflict { .. }));
        assert_eq!(err.field(), Some("username"));

        let err = db
            .create_user(&new_user("alice2", "alice@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_untouched_columns() {
        let db = db().await;
        let user = db.create_user(&new_user("alice", "alice@example.com")).await.unwrap();

        let changes = UserChanges {
            bio: Some("Reads a lot".to_string()),
            role: Some(Role::Moderator),
            ..UserChanges::default()
        };
        let updated = db.update_user(user.id, &changes).await.unwrap();
        assert_eq!(updated.bio, "Reads a lot");
        assert_eq!(updated.role, Role::Moderator);
        assert_eq!(updated.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_search_is_substring_match() {
        let db = db().await;
        for name in ["alice", "malice", "bob"] {
            db.create_user(&new_user(name, &format!("{}@example.com", name)))
                .await
                .unwrap();
        }
        let found: Vec<String> = db
            .list_users(Some("lic"))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(found, vec!["alice", "malice"]);
        assert_eq!(db.list_users(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ensure_superuser_is_idempotent() {
        let db = db().await;
        let first = db.ensure_superuser("root", "root@example.com").await.unwrap();
        let second = db.ensure_superuser("root", "root@example.com").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.is_superuser);
        assert_eq!(second.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_ensure_superuser_ignores_username_with_other_email() {
        let db = db().await;
        let squatter = NewUser {
            username: "root".to_string(),
            email: "someone@elsewhere.test".to_string(),
            is_active: false,
            ..NewUser::default()
        };
        db.create_user(&squatter).await.unwrap();

        let err = db
            .ensure_superuser("root", "root@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, YamdbError::Conflict { .. }));

        let stored = db.user_by_username("root").await.unwrap().unwrap();
        assert_eq!(stored.email, "someone@elsewhere.test");
        assert_eq!(stored.role, Role::User);
        assert!(!stored.is_superuser);
        assert!(!stored.is_active);
    }
}
