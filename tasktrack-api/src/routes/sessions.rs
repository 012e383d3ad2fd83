/// Sessions resource: login and logout
///
/// # Endpoints
///
/// - `POST /v1/sessions` - Log in, returning an opaque access token
/// - `DELETE /v1/sessions/:id` - Log out of a session using its access token
///
/// Only the SHA-256 digest of an access token is stored. The plaintext token
/// is returned once, in the login response.
///
/// A wrong password increments the account's failed-login counter; at three
/// failures the account is locked out and the token gate rejects every
/// session it owns. A successful login resets the counter.

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
    routes::{
        json,
        users::{length_messages, missing_messages},
    },
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::{
        gate::extract_token,
        password::verify_password,
        token::{generate_access_token, hash_access_token},
    },
    models::{session::Session, user::User},
};
use tracing::{info, warn};
use validator::Validate;

const INCORRECT_CREDENTIALS: &str = "Username or password is incorrect";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub password: Option<String>,
}

/// Login response data
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: i64,

    /// Plaintext access token; only its digest is stored
    pub access_token: String,

    /// Token lifetime in seconds
    pub access_token_expires_in: i64,
}

/// Logout response data
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub session_id: i64,
}

/// Log in with username and password
///
/// # Errors
///
/// - `400 Bad Request`: wrong content type, malformed body or field violations
/// - `401 Unauthorized`: unknown user, wrong password, inactive or locked out
/// - `405 Method Not Allowed`: any method other than POST
pub async fn login(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Envelope> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    json::require_json(&headers)?;
    let req: LoginRequest =
        json::parse_object(&body, "Request body contains invalid login fields")?;

    let missing = missing_messages(&[
        ("Username", req.username.is_some()),
        ("Password", req.password.is_some()),
    ]);
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(missing));
    }

    if let Err(errors) = req.validate() {
        return Err(ApiError::BadRequest(length_messages(
            &errors,
            &[
                ("username", "Username", req.username.as_deref().unwrap_or_default()),
                ("password", "Password", req.password.as_deref().unwrap_or_default()),
            ],
        )));
    }

    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let pool = state.db.write();

    let user = User::find_by_username(pool, &username)
        .await
        .map_err(|e| ApiError::database("There was an issue logging in - please try again", e))?
        .ok_or_else(|| ApiError::Unauthorized(INCORRECT_CREDENTIALS.to_string()))?;

    if !user.is_active() {
        return Err(ApiError::Unauthorized("User account is not active".to_string()));
    }

    if user.is_locked_out() {
        return Err(ApiError::Unauthorized(
            "User account is currently locked out".to_string(),
        ));
    }

    if !verify_password(&password, &user.password_hash)? {
        User::record_failed_login(pool, user.id)
            .await
            .map_err(|e| ApiError::database("There was an issue logging in - please try again", e))?;

        warn!(user_id = user.id, "Failed login attempt");
        return Err(ApiError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
    }

    User::reset_login_attempts(pool, user.id)
        .await
        .map_err(|e| ApiError::database("There was an issue logging in - please try again", e))?;

    let ttl = state.config.sessions.access_token_ttl_seconds;
    let (access_token, digest) = generate_access_token();

    let session = Session::create(pool, user.id, &digest, Utc::now() + Duration::seconds(ttl))
        .await
        .map_err(|e| ApiError::database("There was an issue logging in - please try again", e))?;

    info!(user_id = user.id, session_id = session.id, "User logged in");

    Ok(Envelope::created().with_data(&LoginResponse {
        session_id: session.id,
        access_token,
        access_token_expires_in: ttl,
    }))
}

/// Log out of a session
///
/// The session is deleted only when the presented access token belongs to it.
///
/// # Errors
///
/// - `400 Bad Request`: non-numeric id, or no session matches id and token
/// - `401 Unauthorized`: no access token presented
/// - `405 Method Not Allowed`: any method other than DELETE
pub async fn logout(
    State(state): State<AppState>,
    method: Method,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Envelope> {
    if method != Method::DELETE {
        return Err(ApiError::MethodNotAllowed);
    }

    let session_id = raw_id
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request("Session ID cannot be blank and must be numeric"))?;

    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_token(header)?;

    let deleted = Session::delete_with_token(state.db.write(), session_id, &hash_access_token(token))
        .await
        .map_err(|e| ApiError::database("There was an issue logging out - please try again", e))?;

    if !deleted {
        return Err(ApiError::bad_request(
            "Failed to log out of this session using access token provided",
        ));
    }

    info!(session_id, "Session logged out");

    Ok(Envelope::ok()
        .message("Logged out")
        .with_data(&LogoutResponse { session_id }))
}
