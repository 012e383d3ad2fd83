/// Users resource: registration
///
/// # Endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// {
///   "fullname": "Jane Doe",
///   "username": "jane",
///   "password": "correct horse"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "statusCode": 201,
///   "success": true,
///   "messages": ["User created"],
///   "data": { "user_id": 1, "fullname": "Jane Doe", "username": "jane" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: wrong content type, malformed body, missing or
///   out-of-range fields (every violation is listed)
/// - `405 Method Not Allowed`: any method other than POST
/// - `409 Conflict`: username already exists
/// - `500 Internal Server Error`: database or hashing failure

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
    routes::json,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::password,
    models::user::{CreateUser, User},
};
use tracing::info;
use validator::{Validate, ValidationErrors};

/// Registration request
///
/// Fields are optional at the type level so that missing fields can be
/// reported by name instead of as a decoding failure.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub fullname: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub password: Option<String>,
}

impl RegisterRequest {
    /// Trims the full name and username so the blank rule applies to what gets stored
    fn trimmed(self) -> Self {
        Self {
            fullname: self.fullname.map(|v| v.trim().to_string()),
            username: self.username.map(|v| v.trim().to_string()),
            password: self.password,
        }
    }
}

/// Registration response data
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub fullname: String,
    pub username: String,
}

/// Builds one message per field that failed its length rule
///
/// `fields` lists `(field name, label, submitted value)` in the order the
/// messages should appear.
pub(crate) fn length_messages(errors: &ValidationErrors, fields: &[(&str, &str, &str)]) -> Vec<String> {
    let field_errors = errors.field_errors();

    fields
        .iter()
        .filter(|&&(name, _, _)| field_errors.contains_key(name))
        .map(|&(_, label, value)| {
            if value.is_empty() {
                format!("{} cannot be blank", label)
            } else {
                format!("{} cannot be greater than 255 characters", label)
            }
        })
        .collect()
}

/// Lists `"<label> is required"` for every absent field
pub(crate) fn missing_messages(fields: &[(&str, bool)]) -> Vec<String> {
    fields
        .iter()
        .filter(|&&(_, present)| !present)
        .map(|&(label, _)| format!("{} is required", label))
        .collect()
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Envelope> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    json::require_json(&headers)?;
    let req: RegisterRequest = json::parse_object(&body, "Request body contains invalid user fields")?;
    let req = req.trimmed();

    let missing = missing_messages(&[
        ("Full name", req.fullname.is_some()),
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
                ("fullname", "Full name", req.fullname.as_deref().unwrap_or_default()),
                ("username", "Username", req.username.as_deref().unwrap_or_default()),
                ("password", "Password", req.password.as_deref().unwrap_or_default()),
            ],
        )));
    }

    let (Some(fullname), Some(username), Some(plain_password)) =
        (req.fullname, req.username, req.password)
    else {
        return Err(ApiError::Internal("Failed to read registration fields".to_string()));
    };

    let pool = state.db.write();

    let exists = User::username_exists(pool, &username)
        .await
        .map_err(|e| ApiError::database("There was an issue creating a user account - please try again", e))?;
    if exists {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&plain_password)?;

    let user = User::create(
        pool,
        CreateUser {
            full_name: fullname,
            username,
            password_hash,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ApiError::Conflict("Username already exists".to_string())
        }
        e => ApiError::database("There was an issue creating a user account - please try again", e),
    })?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Envelope::created()
        .message("User created")
        .with_data(&RegisterResponse {
            user_id: user.id,
            fullname: user.full_name,
            username: user.username,
        }))
}
