/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task CRUD, filtering and pagination (token protected)
/// - `users`: Registration
/// - `sessions`: Login and logout
///
/// Handlers return `ApiResult<Envelope>`, so every response, including
/// failures, has the envelope shape.

pub mod health;
pub mod json;
pub mod sessions;
pub mod tasks;
pub mod users;

use crate::error::ApiError;

/// Fallback for paths no route matches
pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
