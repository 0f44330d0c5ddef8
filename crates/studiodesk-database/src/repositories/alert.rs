//! Alert and emission-ledger repository.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use studiodesk_core::error::AppError;
use studiodesk_core::result::AppResult;
use studiodesk_core::types::pagination::{PageRequest, PageResponse};
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_entity::alert::{Alert, AlertCandidate, AlertTriple, ParseKindError};

use crate::db_error;

#[derive(Debug, FromRow)]
struct AlertRow {
    id: AlertId,
    user_id: UserId,
    alert_kind: String,
    entity_kind: String,
    entity_id: Uuid,
    title: String,
    message: String,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = ParseKindError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Alert {
            id: row.id,
            user_id: row.user_id,
            kind: row.alert_kind.parse()?,
            entity_kind: row.entity_kind.parse()?,
            entity_id: row.entity_id,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EmissionRow {
    entity_kind: String,
    entity_id: Uuid,
    alert_kind: String,
}

impl TryFrom<EmissionRow> for AlertTriple {
    type Error = ParseKindError;

    fn try_from(row: EmissionRow) -> Result<Self, Self::Error> {
        Ok(AlertTriple {
            entity_kind: row.entity_kind.parse()?,
            entity_id: row.entity_id,
            alert_kind: row.alert_kind.parse()?,
        })
    }
}

/// Repository for alerts and the append-only emission ledger.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Create a new alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every triple ever emitted for `owner`, including those whose alert
    /// has since been deleted.
    pub async fn find_emitted_triples(&self, owner: UserId) -> AppResult<HashSet<AlertTriple>> {
        let rows = sqlx::query_as::<_, EmissionRow>(
            "SELECT entity_kind, entity_id, alert_kind FROM alert_emissions WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load emission ledger", e))?;

        let mut triples = HashSet::with_capacity(rows.len());
        for row in rows {
            match AlertTriple::try_from(row) {
                Ok(triple) => {
                    triples.insert(triple);
                }
                // Kinds this build does not know can never be candidates.
                Err(e) => warn!(owner = %owner, error = %e, "Skipping unrecognized ledger row"),
            }
        }
        Ok(triples)
    }

    /// Record `candidates` in the ledger and insert an alert for each one
    /// whose triple was not already there, in a single statement.
    ///
    /// Returns the number of alerts inserted.
    pub async fn insert_batch(&self, owner: UserId, candidates: &[AlertCandidate]) -> AppResult<u64> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(candidates.len());
        let mut entity_kinds = Vec::with_capacity(candidates.len());
        let mut entity_ids = Vec::with_capacity(candidates.len());
        let mut alert_kinds = Vec::with_capacity(candidates.len());
        let mut titles = Vec::with_capacity(candidates.len());
        let mut messages = Vec::with_capacity(candidates.len());
        for c in candidates {
            ids.push(AlertId::new().into_uuid());
            entity_kinds.push(c.entity_kind.as_str().to_string());
            entity_ids.push(c.entity_id);
            alert_kinds.push(c.alert_kind.to_string());
            titles.push(c.title.clone());
            messages.push(c.message.clone());
        }

        let result = sqlx::query(
            "WITH input AS ( \
                 SELECT DISTINCT ON (entity_kind, entity_id, alert_kind) * \
                 FROM UNNEST($2::uuid[], $3::text[], $4::uuid[], $5::text[], $6::text[], $7::text[]) \
                 AS t(id, entity_kind, entity_id, alert_kind, title, message) \
             ), fresh AS ( \
                 INSERT INTO alert_emissions (user_id, entity_kind, entity_id, alert_kind) \
                 SELECT $1, entity_kind, entity_id, alert_kind FROM input \
                 ON CONFLICT (user_id, entity_kind, entity_id, alert_kind) DO NOTHING \
                 RETURNING entity_kind, entity_id, alert_kind \
             ) \
             INSERT INTO alerts (id, user_id, alert_kind, entity_kind, entity_id, title, message) \
             SELECT i.id, $1, i.alert_kind, i.entity_kind, i.entity_id, i.title, i.message \
             FROM input i JOIN fresh f USING (entity_kind, entity_id, alert_kind)",
        )
        .bind(owner)
        .bind(&ids)
        .bind(&entity_kinds)
        .bind(&entity_ids)
        .bind(&alert_kinds)
        .bind(&titles)
        .bind(&messages)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert alerts", e))?;

        Ok(result.rows_affected())
    }

    /// List alerts for `owner`, newest first.
    pub async fn find_by_user(
        &self,
        owner: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Alert>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count alerts", e))?;

        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT id, user_id, alert_kind, entity_kind, entity_id, title, message, is_read, read_at, created_at \
             FROM alerts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list alerts", e))?;

        let alerts = rows
            .into_iter()
            .map(Alert::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::internal(format!("Corrupt alert row: {e}")))?;

        Ok(PageResponse::new(alerts, page, total.max(0) as u64))
    }

    /// Count unread alerts for `owner`.
    pub async fn count_unread(&self, owner: UserId) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE user_id = $1 AND is_read = FALSE")
                .bind(owner)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count unread alerts", e))?;
        Ok(count.max(0) as u64)
    }

    /// Mark one alert as read. Returns `false` if it does not belong to
    /// `owner` or does not exist.
    pub async fn mark_read(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE alerts SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(alert_id)
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark alert read", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every unread alert of `owner` as read.
    pub async fn mark_all_read(&self, owner: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE alerts SET is_read = TRUE, read_at = NOW() WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark all alerts read", e))?;
        Ok(result.rows_affected())
    }

    /// Delete one alert. The emission ledger is left untouched.
    pub async fn delete(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1 AND user_id = $2")
            .bind(alert_id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete alert", e))?;
        Ok(result.rows_affected() > 0)
    }
}
