//! Payment repository (read side used by the aging scanner).

use sqlx::PgPool;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_entity::payment::PendingPayment;

use crate::db_error;

/// Read access to payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Payments of `owner` still awaiting settlement, oldest first.
    pub async fn find_pending(&self, owner: UserId) -> AppResult<Vec<PendingPayment>> {
        sqlx::query_as::<_, PendingPayment>(
            "SELECT id, user_id, amount, currency, description, status, created_at \
             FROM payments WHERE user_id = $1 AND status = 'pending' \
             ORDER BY created_at ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list pending payments", e))
    }
}
