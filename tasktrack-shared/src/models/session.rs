/// Session model and database operations
///
/// A session maps one opaque access token to a user until the token expires.
/// Only the SHA-256 digest of the token is stored; see [`crate::auth::token`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     access_token CHAR(64) NOT NULL UNIQUE,
///     access_token_expiry TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Session row (token digest omitted)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub access_token_expiry: DateTime<Utc>,
}

/// Everything the authentication gate needs to decide on a token
///
/// Produced by joining `sessions` with `users`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub access_token_expiry: DateTime<Utc>,
    pub user_active: String,
    pub login_attempts: i32,
}

impl Session {
    /// Stores a new session for the user
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        access_token_hash: &str,
        access_token_expiry: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, access_token, access_token_expiry)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, access_token_expiry
            "#,
        )
        .bind(user_id)
        .bind(access_token_hash)
        .bind(access_token_expiry)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Resolves a token digest to the owning user's identity and account state
    pub async fn find_identity(
        pool: &PgPool,
        access_token_hash: &str,
    ) -> Result<Option<SessionIdentity>, sqlx::Error> {
        let identity = sqlx::query_as::<_, SessionIdentity>(
            r#"
            SELECT sessions.user_id, sessions.access_token_expiry,
                   users.user_active, users.login_attempts
            FROM sessions
            JOIN users ON sessions.user_id = users.id
            WHERE sessions.access_token = $1
            "#,
        )
        .bind(access_token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(identity)
    }

    /// Deletes a session only if the presented token belongs to it
    ///
    /// # Returns
    ///
    /// True if a session was deleted
    pub async fn delete_with_token(
        pool: &PgPool,
        id: i64,
        access_token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1 AND access_token = $2")
            .bind(id)
            .bind(access_token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
