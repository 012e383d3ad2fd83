/// Error handling for the API server
///
/// Handlers return `ApiResult<Envelope>`. Every failure is an `ApiError`, which
/// converts into a failure [`Envelope`] carrying the matching HTTP status and
/// one or more messages. This is the single place where an internal error
/// kind becomes a status code.
///
/// Database failures are logged here, at the point of conversion, and replaced
/// by a caller-chosen public message. Raw database text never reaches clients.
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::{envelope::Envelope, error::{ApiError, ApiResult}};
/// use sqlx::PgPool;
///
/// async fn handler(pool: PgPool) -> ApiResult<Envelope> {
///     sqlx::query("SELECT 1")
///         .execute(&pool)
///         .await
///         .map_err(|e| ApiError::database("Failed to get tasks", e))?;
///     Ok(Envelope::ok())
/// }
/// ```

use crate::envelope::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tasktrack_shared::{
    auth::{gate::AuthError, password::PasswordError},
    models::task::{TaskStoreError, TaskValidationError},
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad request (400), one message per violation
    BadRequest(Vec<String>),

    /// Authentication failed (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Method not supported on this endpoint (405)
    MethodNotAllowed,

    /// Conflict (409), e.g. duplicate username
    Conflict(String),

    /// Internal server error (500); the message is safe to show clients
    Internal(String),
}

impl ApiError {
    /// Single-message 400
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(vec![message.into()])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Logs a database failure and hides it behind `public_message`
    pub fn database(public_message: &str, err: impl fmt::Display) -> Self {
        tracing::error!(error = %err, "{}", public_message);
        ApiError::Internal(public_message.to_string())
    }

    /// Maps a task query failure to a 500
    ///
    /// Query failures are hidden behind `public_message`; a stored row that no
    /// longer validates reports its violations.
    pub fn task_store(public_message: &str, err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::Database(e) => ApiError::database(public_message, e),
            TaskStoreError::InvalidRow(e) => {
                tracing::error!(error = %e, "Stored task failed validation");
                ApiError::Internal(e.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Messages shown to the client
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::BadRequest(messages) => messages.clone(),
            ApiError::MethodNotAllowed => vec!["Request method not allowed".to_string()],
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => vec![msg.clone()],
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(messages) => write!(f, "Bad request: {}", messages.join("; ")),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::MethodNotAllowed => write!(f, "Method not allowed"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::new(self.status())
            .messages(self.messages())
            .into_response()
    }
}

/// Task validation failures are client errors listing every violation
impl From<TaskValidationError> for ApiError {
    fn from(err: TaskValidationError) -> Self {
        ApiError::BadRequest(err.messages)
    }
}

/// Convert gate rejections to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(ref detail) => {
                tracing::error!(error = %detail, "Authentication lookup failed");
                ApiError::Internal(err.to_string())
            }
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "Password operation failed");
        ApiError::Internal("Password operation failed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::not_found("Task not found");
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_keeps_every_message() {
        let err: ApiError = TaskValidationError {
            messages: vec!["Title bad".to_string(), "Completed bad".to_string()],
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.messages(), vec!["Title bad", "Completed bad"]);
    }

    #[test]
    fn test_auth_errors_map_to_401_except_database() {
        let err: ApiError = AuthError::LockedOut.into();
        assert_eq!(err, ApiError::Unauthorized("User account is currently locked out".into()));

        let err: ApiError = AuthError::DatabaseError("connection refused".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.messages()[0].contains("connection refused"));
    }

    #[test]
    fn test_database_error_hides_detail() {
        let err = ApiError::database("Failed to get task", "relation \"tasks\" does not exist");
        assert_eq!(err, ApiError::Internal("Failed to get task".to_string()));
    }
}
