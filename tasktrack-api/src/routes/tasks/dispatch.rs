/// Maps a tasks request to the operation it selects
///
/// Query parameters are checked in a fixed precedence and the first one
/// present decides the branch:
///
/// 1. `taskid` selects a single-task operation (GET, PATCH, DELETE)
/// 2. `completed` selects the filtered list (GET)
/// 3. `page` selects the paginated list (GET)
/// 4. no parameters selects the full list (GET) or create (POST)
///
/// Anything else is an unknown endpoint. This function never touches the
/// database, so every rejection it produces is decided before any query runs.

use crate::error::ApiError;
use axum::http::Method;
use std::collections::HashMap;
use tasktrack_shared::models::task::Completed;

/// Operation selected by method and query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRoute {
    Get(i64),
    Patch(i64),
    Delete(i64),
    ByCompleted(Completed),
    Page(u64),
    ListAll,
    Create,
}

/// Resolves the route for a request
///
/// # Errors
///
/// - `400` for a blank or non-numeric `taskid`, a `completed` value other
///   than `Y`/`N`, or a non-numeric `page`
/// - `405` when the method is not supported by the selected branch
/// - `404` for unrecognised query parameters
pub fn resolve(method: &Method, params: &HashMap<String, String>) -> Result<TaskRoute, ApiError> {
    if let Some(raw) = params.get("taskid") {
        let id = raw
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request("Task ID cannot be blank and must be numeric"))?;

        return match *method {
            Method::GET => Ok(TaskRoute::Get(id)),
            Method::PATCH => Ok(TaskRoute::Patch(id)),
            Method::DELETE => Ok(TaskRoute::Delete(id)),
            _ => Err(ApiError::MethodNotAllowed),
        };
    }

    if let Some(raw) = params.get("completed") {
        let completed = Completed::parse(raw)
            .ok_or_else(|| ApiError::bad_request("Completed filter must be Y or N"))?;

        return match *method {
            Method::GET => Ok(TaskRoute::ByCompleted(completed)),
            _ => Err(ApiError::MethodNotAllowed),
        };
    }

    if let Some(raw) = params.get("page") {
        if *method != Method::GET {
            return Err(ApiError::MethodNotAllowed);
        }

        let page = raw
            .parse::<u64>()
            .map_err(|_| ApiError::bad_request("Invalid page number"))?;

        return Ok(TaskRoute::Page(page));
    }

    if params.is_empty() {
        return match *method {
            Method::GET => Ok(TaskRoute::ListAll),
            Method::POST => Ok(TaskRoute::Create),
            _ => Err(ApiError::MethodNotAllowed),
        };
    }

    Err(ApiError::not_found("Endpoint not found"))
}
