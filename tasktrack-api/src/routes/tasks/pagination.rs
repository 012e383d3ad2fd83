/// Page arithmetic and list payloads
///
/// For page size `P` and `R` owned rows, `total_pages = ceil(R / P)` with a
/// floor of 1, so an empty task list still has one (empty) page. Page `0` and
/// pages beyond the last are not found.

use crate::error::ApiError;
use serde::Serialize;
use tasktrack_shared::models::task::Task;

/// Position of one page within the full list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total_pages: u64,
    pub offset: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Computes the window for `page`
///
/// # Errors
///
/// `404 Page not found` when `page` is 0 or greater than the page count.
pub fn compute(total_rows: u64, page_size: u64, page: u64) -> Result<PageWindow, ApiError> {
    let page_size = page_size.max(1);
    let total_pages = total_rows.div_ceil(page_size).max(1);

    if page == 0 || page > total_pages {
        return Err(ApiError::not_found("Page not found"));
    }

    Ok(PageWindow {
        total_pages,
        offset: (page - 1) * page_size,
        has_next_page: page < total_pages,
        has_prev_page: page > 1,
    })
}

/// Pagination fields reported alongside a page of tasks
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub total_rows: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// `data` payload of every task fetch or listing
#[derive(Debug, Clone, Serialize)]
pub struct TaskList {
    pub rows_returned: usize,
    #[serde(flatten)]
    pub page: Option<PageInfo>,
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            rows_returned: tasks.len(),
            page: None,
            tasks,
        }
    }

    pub fn paged(tasks: Vec<Task>, total_rows: u64, window: PageWindow) -> Self {
        Self {
            rows_returned: tasks.len(),
            page: Some(PageInfo {
                total_rows,
                total_pages: window.total_pages,
                has_next_page: window.has_next_page,
                has_prev_page: window.has_prev_page,
            }),
            tasks,
        }
    }
}
