//! Alert settings repository.

use sqlx::{FromRow, PgPool};

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_entity::alert::AlertSettings;

use crate::db_error;

#[derive(Debug, FromRow)]
struct SettingsRow {
    lead_days: Vec<i32>,
    payment_aging: bool,
}

impl From<SettingsRow> for AlertSettings {
    fn from(row: SettingsRow) -> Self {
        AlertSettings::new(
            row.lead_days
                .into_iter()
                .filter_map(|d| u32::try_from(d).ok()),
            row.payment_aging,
        )
    }
}

/// Persistence for per-user [`AlertSettings`].
#[derive(Debug, Clone)]
pub struct AlertSettingsRepository {
    pool: PgPool,
}

impl AlertSettingsRepository {
    /// Create a new settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored settings for `owner`, if the user ever saved any.
    pub async fn find(&self, owner: UserId) -> AppResult<Option<AlertSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT lead_days, payment_aging FROM alert_settings WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get alert settings", e))?;

        Ok(row.map(AlertSettings::from))
    }

    /// Insert or replace the settings for `owner`.
    pub async fn upsert(&self, owner: UserId, settings: &AlertSettings) -> AppResult<()> {
        let lead_days: Vec<i32> = settings
            .lead_days
            .iter()
            .filter_map(|d| i32::try_from(*d).ok())
            .collect();

        sqlx::query(
            "INSERT INTO alert_settings (user_id, lead_days, payment_aging, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET lead_days = EXCLUDED.lead_days, payment_aging = EXCLUDED.payment_aging, updated_at = NOW()",
        )
        .bind(owner)
        .bind(&lead_days)
        .bind(settings.payment_aging)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to upsert alert settings", e))?;

        Ok(())
    }
}
