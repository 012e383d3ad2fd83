/// Access-token authentication gate
///
/// Resolves the raw `Authorization` header value to the id of the user that
/// owns the session. The checks run in a fixed order and the first failure
/// wins:
///
/// 1. header absent or empty
/// 2. no session with this token
/// 3. account not active
/// 4. account locked out (3 or more failed logins)
/// 5. token expired
///
/// Activation and lockout are checked before expiry, so an expired token on a
/// locked account reports the lockout.
///
/// The resolved [`AuthContext`] is the only source of the user id for any
/// task query made during the request.
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::auth::gate::authenticate;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = authenticate(&pool, Some("pZ0c...token")).await?;
/// println!("Authenticated user {}", auth.user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::token::hash_access_token;
use crate::models::{
    session::{Session, SessionIdentity},
    user::{is_active_flag, is_locked_out},
};

/// Authenticated caller, added to request extensions by the API layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Owning user id for every data operation in this request
    pub user_id: i64,
}

/// Reasons the gate rejects a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Access token cannot be blank")]
    MissingToken,

    #[error("Invalid access token")]
    InvalidToken,

    #[error("User account is not active")]
    AccountInactive,

    #[error("User account is currently locked out")]
    LockedOut,

    #[error("Access token has expired")]
    TokenExpired,

    /// The session lookup failed; the detail is for server logs only
    #[error("There was an issue authenticating - please try again")]
    DatabaseError(String),
}

/// Extracts the token from a raw `Authorization` header value
///
/// The value is used as-is; a leading `Bearer ` scheme is tolerated.
pub fn extract_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value);

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Applies the gate's decision sequence to a looked-up session
pub fn evaluate(
    identity: Option<SessionIdentity>,
    now: DateTime<Utc>,
) -> Result<AuthContext, AuthError> {
    let identity = identity.ok_or(AuthError::InvalidToken)?;

    if !is_active_flag(&identity.user_active) {
        return Err(AuthError::AccountInactive);
    }

    if is_locked_out(identity.login_attempts) {
        return Err(AuthError::LockedOut);
    }

    if now >= identity.access_token_expiry {
        return Err(AuthError::TokenExpired);
    }

    Ok(AuthContext {
        user_id: identity.user_id,
    })
}

/// Authenticates a request from its raw `Authorization` header value
///
/// # Errors
///
/// Returns the first failing check as an [`AuthError`]. A failed lookup is
/// reported as [`AuthError::DatabaseError`].
pub async fn authenticate(pool: &PgPool, header: Option<&str>) -> Result<AuthContext, AuthError> {
    let token = extract_token(header)?;

    let identity = Session::find_identity(pool, &hash_access_token(token))
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Session lookup failed: {}", e)))?;

    let context = evaluate(identity, Utc::now())?;
    debug!(user_id = context.user_id, "Access token accepted");

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn identity(active: &str, attempts: i32, expiry: DateTime<Utc>) -> SessionIdentity {
        SessionIdentity {
            user_id: 42,
            access_token_expiry: expiry,
            user_active: active.to_string(),
            login_attempts: attempts,
        }
    }

    #[test]
    fn test_extract_token_missing_or_blank() {
        assert_eq!(extract_token(None), Err(AuthError::MissingToken));
        assert_eq!(extract_token(Some("")), Err(AuthError::MissingToken));
        assert_eq!(extract_token(Some("Bearer ")), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_extract_token_raw_and_bearer() {
        assert_eq!(extract_token(Some("abc123")), Ok("abc123"));
        assert_eq!(extract_token(Some("Bearer abc123")), Ok("abc123"));
    }

    #[test]
    fn test_unknown_token_is_invalid() {
        assert_eq!(evaluate(None, Utc::now()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_valid_session_yields_user_id() {
        let now = Utc::now();
        let result = evaluate(Some(identity("Y", 0, now + Duration::minutes(20))), now);
        assert_eq!(result, Ok(AuthContext { user_id: 42 }));
    }

    #[test]
    fn test_inactive_account() {
        let now = Utc::now();
        let result = evaluate(Some(identity("N", 0, now + Duration::minutes(20))), now);
        assert_eq!(result, Err(AuthError::AccountInactive));
    }

    #[test]
    fn test_locked_out_account() {
        let now = Utc::now();
        let result = evaluate(Some(identity("Y", 3, now + Duration::minutes(20))), now);
        assert_eq!(result, Err(AuthError::LockedOut));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let result = evaluate(Some(identity("Y", 2, now - Duration::seconds(1))), now);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let now = Utc::now();
        let result = evaluate(Some(identity("Y", 0, now)), now);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_lockout_reported_before_expiry() {
        let now = Utc::now();
        let result = evaluate(Some(identity("Y", 5, now - Duration::hours(1))), now);
        assert_eq!(result, Err(AuthError::LockedOut));
    }

    #[test]
    fn test_inactive_reported_before_lockout_and_expiry() {
        let now = Utc::now();
        let result = evaluate(Some(identity("N", 5, now - Duration::hours(1))), now);
        assert_eq!(result, Err(AuthError::AccountInactive));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthError::MissingToken.to_string(), "Access token cannot be blank");
        assert_eq!(AuthError::TokenExpired.to_string(), "Access token has expired");
        assert_eq!(
            AuthError::DatabaseError("boom".to_string()).to_string(),
            "There was an issue authenticating - please try again"
        );
    }
}
