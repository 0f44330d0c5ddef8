//! Project repository (read side used by the deadline scanner).

use sqlx::PgPool;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_entity::project::ProjectDeadline;

use crate::db_error;

/// Read access to projects.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Projects of `owner` that are neither completed nor cancelled and
    /// have a deadline.
    pub async fn find_open_with_deadline(&self, owner: UserId) -> AppResult<Vec<ProjectDeadline>> {
        sqlx::query_as::<_, ProjectDeadline>(
            "SELECT id, user_id, name, deadline, status FROM projects \
             WHERE user_id = $1 AND status NOT IN ('completed', 'cancelled') \
             AND deadline IS NOT NULL",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list open projects", e))
    }
}
