//! Task repository (read side used by the due-date scanner).

use sqlx::PgPool;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_entity::task::TaskDue;

use crate::db_error;

/// Read access to tasks.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tasks of `owner` that are still open and have a due date.
    pub async fn find_open_with_due_date(&self, owner: UserId) -> AppResult<Vec<TaskDue>> {
        sqlx::query_as::<_, TaskDue>(
            "SELECT id, user_id, title, due_date, status FROM tasks \
             WHERE user_id = $1 AND status NOT IN ('completed', 'cancelled') \
             AND due_date IS NOT NULL",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list open tasks", e))
    }
}
