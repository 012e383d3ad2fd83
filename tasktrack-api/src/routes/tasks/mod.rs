/// Tasks resource
///
/// Every request reaching this handler has already passed the access-token
/// gate, which places an [`AuthContext`] in the request extensions. The user
/// id from that context scopes every query below; there is no other source of
/// ownership.
///
/// # Endpoints
///
/// ```text
/// GET    /v1/tasks?taskid=N        fetch one task            (cacheable)
/// PATCH  /v1/tasks?taskid=N        partial update
/// DELETE /v1/tasks?taskid=N        delete
/// GET    /v1/tasks?completed=Y|N   filtered list             (cacheable)
/// GET    /v1/tasks?page=N          paginated list            (cacheable)
/// GET    /v1/tasks                 every owned task
/// POST   /v1/tasks                 create
/// ```
///
/// Plain reads go to the read pool. Writes and the re-fetch that confirms a
/// write go to the write pool.

pub mod dispatch;
pub mod pagination;

use crate::{
    app::AppState,
    envelope::Envelope,
    error::{ApiError, ApiResult},
    routes::json,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method},
    Extension,
};
use dispatch::TaskRoute;
use pagination::TaskList;
use std::collections::HashMap;
use tasktrack_shared::{
    auth::gate::AuthContext,
    models::task::{Completed, Task, TaskPatch},
};
use tracing::{debug, info};

const INVALID_FIELDS: &str = "Request body contains invalid task fields";

/// Single entry point for `/v1/tasks`
pub async fn handle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Envelope> {
    let route = dispatch::resolve(&method, &params)?;
    debug!(user_id = auth.user_id, ?route, "Dispatching tasks request");

    match route {
        TaskRoute::Get(id) => get_task(&state, auth, id).await,
        TaskRoute::Delete(id) => delete_task(&state, auth, id).await,
        TaskRoute::Patch(id) => update_task(&state, auth, id, &headers, &body).await,
        TaskRoute::ByCompleted(completed) => list_by_completed(&state, auth, completed).await,
        TaskRoute::Page(page) => list_page(&state, auth, page).await,
        TaskRoute::ListAll => list_all(&state, auth).await,
        TaskRoute::Create => create_task(&state, auth, &headers, &body).await,
    }
}

async fn get_task(state: &AppState, auth: AuthContext, id: i64) -> ApiResult<Envelope> {
    let task = Task::find_for_user(state.db.read(), id, auth.user_id)
        .await
        .map_err(|e| ApiError::task_store("Failed to get task", e))?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    Ok(Envelope::ok()
        .with_data(&TaskList::new(vec![task]))
        .cacheable(state.config.api.cache_max_age_seconds))
}

async fn delete_task(state: &AppState, auth: AuthContext, id: i64) -> ApiResult<Envelope> {
    let deleted = Task::delete_for_user(state.db.write(), id, auth.user_id)
        .await
        .map_err(|e| ApiError::database("Failed to delete task", e))?;

    if !deleted {
        return Err(ApiError::not_found("Task not found"));
    }

    info!(user_id = auth.user_id, task_id = id, "Task deleted");
    Ok(Envelope::ok().message("Task deleted"))
}

async fn update_task(
    state: &AppState,
    auth: AuthContext,
    id: i64,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Envelope> {
    json::require_json(headers)?;
    let patch: TaskPatch = json::parse_object(body, INVALID_FIELDS)?;

    if patch.is_empty() {
        return Err(ApiError::bad_request("No task fields provided"));
    }

    let pool = state.db.write();

    let existing = Task::find_for_user(pool, id, auth.user_id)
        .await
        .map_err(|e| ApiError::task_store("Failed to update task", e))?
        .ok_or_else(|| ApiError::not_found("No task found to update"))?;

    let updated = existing.apply(&patch)?;

    let rows = updated
        .update_fields(pool, id, auth.user_id, &patch)
        .await
        .map_err(|e| ApiError::database("Failed to update task", e))?;

    if rows == 0 {
        return Err(ApiError::bad_request("Task not updated"));
    }

    let task = Task::find_for_user(pool, id, auth.user_id)
        .await
        .map_err(|e| ApiError::task_store("Failed to update task", e))?
        .ok_or_else(|| ApiError::Internal("No task found after update".to_string()))?;

    info!(user_id = auth.user_id, task_id = id, "Task updated");
    Ok(Envelope::ok()
        .message("Task updated")
        .with_data(&TaskList::new(vec![task])))
}

async fn list_by_completed(
    state: &AppState,
    auth: AuthContext,
    completed: Completed,
) -> ApiResult<Envelope> {
    let tasks = Task::list_by_completed(state.db.read(), auth.user_id, completed)
        .await
        .map_err(|e| ApiError::task_store("Failed to get tasks", e))?;

    Ok(Envelope::ok()
        .with_data(&TaskList::new(tasks))
        .cacheable(state.config.api.cache_max_age_seconds))
}

async fn list_page(state: &AppState, auth: AuthContext, page: u64) -> ApiResult<Envelope> {
    let pool = state.db.read();
    let page_size = u64::from(state.config.tasks.page_size);

    let total_rows = Task::count_for_user(pool, auth.user_id)
        .await
        .map_err(|e| ApiError::database("Failed to get tasks", e))?;
    let total_rows = u64::try_from(total_rows).unwrap_or(0);

    let window = pagination::compute(total_rows, page_size, page)?;

    let tasks = Task::list_page(
        pool,
        auth.user_id,
        i64::from(state.config.tasks.page_size),
        i64::try_from(window.offset).map_err(|_| ApiError::not_found("Page not found"))?,
    )
    .await
    .map_err(|e| ApiError::task_store("Failed to get tasks", e))?;

    Ok(Envelope::ok()
        .with_data(&TaskList::paged(tasks, total_rows, window))
        .cacheable(state.config.api.cache_max_age_seconds))
}

async fn list_all(state: &AppState, auth: AuthContext) -> ApiResult<Envelope> {
    let tasks = Task::list_for_user(state.db.read(), auth.user_id)
        .await
        .map_err(|e| ApiError::task_store("Failed to get tasks", e))?;

    Ok(Envelope::ok().with_data(&TaskList::new(tasks)))
}

async fn create_task(
    state: &AppState,
    auth: AuthContext,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Envelope> {
    json::reject_non_json(headers)?;
    let fields: TaskPatch = json::parse_object(body, INVALID_FIELDS)?;

    let (title, completed) = match (fields.title, fields.completed) {
        (Some(title), Some(completed)) => (title, completed),
        (title, completed) => {
            let mut missing = Vec::new();
            if title.is_none() {
                missing.push("Title field is mandatory");
            }
            if completed.is_none() {
                missing.push("Completed field is mandatory");
            }
            return Err(ApiError::BadRequest(
                missing.into_iter().map(String::from).collect(),
            ));
        }
    };

    let task = Task::new(None, title, fields.description, fields.deadline, &completed)?;

    let pool = state.db.write();

    let id = task
        .insert(pool, auth.user_id)
        .await
        .map_err(|e| ApiError::database("Failed to create task", e))?
        .ok_or_else(|| ApiError::Internal("Failed to create task".to_string()))?;

    let created = Task::find_for_user(pool, id, auth.user_id)
        .await
        .map_err(|e| ApiError::task_store("Failed to retrieve task after creation", e))?
        .ok_or_else(|| ApiError::Internal("Failed to retrieve task after creation".to_string()))?;

    info!(user_id = auth.user_id, task_id = id, "Task created");
    Ok(Envelope::created()
        .message("Task created")
        .with_data(&TaskList::new(vec![created])))
}
