/// Task model and database operations
///
/// A [`Task`] is the validated domain record for a single to-do item. Records
/// are only ever produced by [`Task::new`] (or [`Task::apply`], which goes
/// through the same constructor), so holding a `Task` means every field has
/// already passed validation.
///
/// Every query in this module is scoped to the owning user's id. There is no
/// way to read or write a task without naming its owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description VARCHAR(255),
///     deadline TIMESTAMP,
///     completed CHAR(1) NOT NULL DEFAULT 'N' CHECK (completed IN ('Y', 'N')),
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Deadlines
///
/// Deadlines travel as display strings in `dd/mm/yyyy HH:MM` form. The database
/// does the conversion in both directions (`to_timestamp` on write, `to_char` on
/// read); no timezone conversion happens here.
///
/// # Example
///
/// ```
/// use tasktrack_shared::models::task::{Completed, Task};
///
/// let task = Task::new(
///     None,
///     "Buy milk".to_string(),
///     None,
///     Some("01/02/2025 09:30".to_string()),
///     "N",
/// )
/// .unwrap();
///
/// assert_eq!(task.completed(), Completed::No);
/// assert_eq!(task.deadline(), Some("01/02/2025 09:30"));
/// ```

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// chrono format of a deadline display string
pub const DEADLINE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// The same format expressed for PostgreSQL's `to_char`/`to_timestamp`
const DEADLINE_SQL_FORMAT: &str = "DD/MM/YYYY HH24:MI";

/// Maximum length, in characters, of the title and description
pub const MAX_TEXT_LENGTH: usize = 255;

/// Completion flag, stored and serialized as `"Y"` or `"N"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completed {
    #[serde(rename = "Y")]
    Yes,

    #[serde(rename = "N")]
    No,
}

impl Completed {
    /// Parses the exact strings `"Y"` and `"N"`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Y" => Some(Completed::Yes),
            "N" => Some(Completed::No),
            _ => None,
        }
    }

    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Completed::Yes => "Y",
            Completed::No => "N",
        }
    }
}

/// One or more task fields failed validation
///
/// Carries every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct TaskValidationError {
    pub messages: Vec<String>,
}

/// Errors from task queries
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// The query itself failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row no longer satisfies the task invariants
    #[error("Stored task failed validation: {0}")]
    InvalidRow(#[from] TaskValidationError),
}

/// Validated task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: Option<i64>,
    title: String,
    description: Option<String>,
    deadline: Option<String>,
    completed: Completed,
}

/// Partial update for a task
///
/// Each field is `Some` only when the client supplied it. JSON `null` is treated
/// the same as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub completed: Option<String>,
}

impl TaskPatch {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.completed.is_none()
    }
}

/// Raw row as selected from `tasks`, before validation
#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    deadline: Option<String>,
    completed: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskValidationError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Task::new(
            Some(row.id),
            row.title,
            row.description,
            row.deadline,
            row.completed.trim_end(),
        )
    }
}

const SELECT_COLUMNS: &str = "id, title, description, \
     to_char(deadline, 'DD/MM/YYYY HH24:MI') AS deadline, completed";

impl Task {
    /// Builds a task, validating every field at once
    ///
    /// # Errors
    ///
    /// Returns `TaskValidationError` listing every violated rule:
    /// - `id`, when present, must be positive
    /// - `title` must be 1-255 characters
    /// - `description` must be at most 255 characters
    /// - `deadline` must parse as `dd/mm/yyyy HH:MM`
    /// - `completed` must be exactly `Y` or `N`
    pub fn new(
        id: Option<i64>,
        title: String,
        description: Option<String>,
        deadline: Option<String>,
        completed: &str,
    ) -> Result<Self, TaskValidationError> {
        let mut messages = Vec::new();

        if matches!(id, Some(id) if id <= 0) {
            messages.push("Task ID must be a positive integer".to_string());
        }

        let title_length = title.chars().count();
        if title_length == 0 || title_length > MAX_TEXT_LENGTH {
            messages.push(format!(
                "Title must be between 1 and {} characters",
                MAX_TEXT_LENGTH
            ));
        }

        if let Some(ref description) = description {
            if description.chars().count() > MAX_TEXT_LENGTH {
                messages.push(format!(
                    "Description cannot be greater than {} characters",
                    MAX_TEXT_LENGTH
                ));
            }
        }

        let deadline = match deadline {
            Some(raw) => match normalize_deadline(&raw) {
                Some(normalized) => Some(normalized),
                None => {
                    messages.push("Deadline must be in the format dd/mm/yyyy HH:MM".to_string());
                    None
                }
            },
            None => None,
        };

        let completed = Completed::parse(completed);
        if completed.is_none() {
            messages.push("Completed must be Y or N".to_string());
        }

        match completed {
            Some(completed) if messages.is_empty() => Ok(Self {
                id,
                title,
                description,
                deadline,
                completed,
            }),
            _ => Err(TaskValidationError { messages }),
        }
    }

    /// Returns a new record with the patch applied
    ///
    /// Fields absent from the patch keep their current value. The whole result is
    /// re-validated; on failure `self` is untouched.
    pub fn apply(&self, patch: &TaskPatch) -> Result<Self, TaskValidationError> {
        Task::new(
            self.id,
            patch.title.clone().unwrap_or_else(|| self.title.clone()),
            patch.description.clone().or_else(|| self.description.clone()),
            patch.deadline.clone().or_else(|| self.deadline.clone()),
            patch
                .completed
                .as_deref()
                .unwrap_or_else(|| self.completed.as_str()),
        )
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Deadline in `dd/mm/yyyy HH:MM` form
    pub fn deadline(&self) -> Option<&str> {
        self.deadline.as_deref()
    }

    pub fn completed(&self) -> Completed {
        self.completed
    }

    /// Finds one task by id, scoped to its owner
    pub async fn find_for_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, TaskStoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Task::try_from).transpose()?)
    }

    /// Lists every task owned by the user
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, TaskStoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        into_tasks(rows)
    }

    /// Lists the user's tasks with the given completion flag
    pub async fn list_by_completed(
        pool: &PgPool,
        user_id: i64,
        completed: Completed,
    ) -> Result<Vec<Self>, TaskStoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE completed = $1 AND user_id = $2 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(completed.as_str())
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        into_tasks(rows)
    }

    /// Lists one page of the user's tasks
    pub async fn list_page(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, TaskStoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        into_tasks(rows)
    }

    /// Counts the tasks owned by the user
    pub async fn count_for_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(id) FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Inserts a new task for the user
    ///
    /// # Returns
    ///
    /// The generated id, or `None` if no row was inserted
    pub async fn insert(&self, pool: &PgPool, user_id: i64) -> Result<Option<i64>, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            INSERT INTO tasks (title, description, deadline, completed, user_id)
            VALUES ($1, $2, to_timestamp($3, '{}')::timestamp, $4, $5)
            RETURNING id
            "#,
            DEADLINE_SQL_FORMAT
        ))
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.deadline)
        .bind(self.completed.as_str())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(id)
    }

    /// Writes the columns named by `patch`, taking values from `self`
    ///
    /// `self` is expected to be the result of [`Task::apply`] with the same
    /// patch. Only supplied fields appear in the `SET` clause.
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 when the task does not exist for this user)
    pub async fn update_fields(
        &self,
        pool: &PgPool,
        id: i64,
        user_id: i64,
        patch: &TaskPatch,
    ) -> Result<u64, sqlx::Error> {
        let mut assignments = Vec::new();
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            assignments.push(format!("title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if patch.deadline.is_some() {
            bind_count += 1;
            assignments.push(format!(
                "deadline = to_timestamp(${}, '{}')::timestamp",
                bind_count, DEADLINE_SQL_FORMAT
            ));
        }
        if patch.completed.is_some() {
            bind_count += 1;
            assignments.push(format!("completed = ${}", bind_count));
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = $1 AND user_id = $2",
            assignments.join(", ")
        );

        let mut q = sqlx::query(&query).bind(id).bind(user_id);

        if patch.title.is_some() {
            q = q.bind(&self.title);
        }
        if patch.description.is_some() {
            q = q.bind(&self.description);
        }
        if patch.deadline.is_some() {
            q = q.bind(&self.deadline);
        }
        if patch.completed.is_some() {
            q = q.bind(self.completed.as_str());
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected())
    }

    /// Deletes a task, scoped to its owner
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete_for_user(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> Result<Vec<Task>, TaskStoreError> {
    rows.into_iter()
        .map(|row| Task::try_from(row).map_err(TaskStoreError::from))
        .collect()
}

/// Parses a deadline and re-renders it in canonical zero-padded form
fn normalize_deadline(raw: &str) -> Option<String> {
    // PostgreSQL has no year 0 and to_char renders four-digit years
    NaiveDateTime::parse_from_str(raw, DEADLINE_FORMAT)
        .ok()
        .filter(|parsed| (1..=9999).contains(&parsed.year()))
        .map(|parsed| parsed.format(DEADLINE_FORMAT).to_string())
}
