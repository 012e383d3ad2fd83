/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     full_name VARCHAR(255) NOT NULL,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     user_active CHAR(1) NOT NULL DEFAULT 'Y',
///     login_attempts INTEGER NOT NULL DEFAULT 0
/// );
/// ```
///
/// Users are created through registration and never deleted by this service.
/// `user_active` and `login_attempts` gate every token-authenticated request.

use sqlx::PgPool;

/// Failed logins at which an account is considered locked out
pub const MAX_LOGIN_ATTEMPTS: i32 = 3;

/// Value of `user_active` for an active account
pub const ACTIVE_FLAG: &str = "Y";

/// Returns true if the stored activation flag marks the account active
pub fn is_active_flag(flag: &str) -> bool {
    flag.trim_end() == ACTIVE_FLAG
}

/// Returns true if the failed-login counter has reached the lockout threshold
pub fn is_locked_out(login_attempts: i32) -> bool {
    login_attempts >= MAX_LOGIN_ATTEMPTS
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    pub full_name: String,

    /// Unique login name
    pub username: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// `Y` or `N`
    pub user_active: String,

    /// Consecutive failed logins since the last successful one
    pub login_attempts: i32,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub full_name: String,
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    pub fn is_active(&self) -> bool {
        is_active_flag(&self.user_active)
    }

    pub fn is_locked_out(&self) -> bool {
        is_locked_out(self.login_attempts)
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate username (unique constraint
    /// `users_username_key`) or a connection failure.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, username, password_hash, user_active, login_attempts
            "#,
        )
        .bind(data.full_name)
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, password_hash, user_active, login_attempts
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a username is already taken
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Increments the failed-login counter
    pub async fn record_failed_login(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET login_attempts = login_attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Clears the failed-login counter after a successful login
    pub async fn reset_login_attempts(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET login_attempts = 0 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
