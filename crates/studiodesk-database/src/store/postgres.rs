//! PostgreSQL-backed [`AlertStore`].

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::pagination::{PageRequest, PageResponse};
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_entity::alert::{Alert, AlertCandidate, AlertSettings, AlertTriple};
use studiodesk_entity::payment::PendingPayment;
use studiodesk_entity::project::ProjectDeadline;
use studiodesk_entity::task::TaskDue;

use crate::repositories::{
    AlertRepository, AlertSettingsRepository, PaymentRepository, ProjectRepository, TaskRepository,
};

use super::{AlertInbox, AlertStore};

/// [`AlertStore`] composed from the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgAlertStore {
    settings: AlertSettingsRepository,
    projects: ProjectRepository,
    tasks: TaskRepository,
    payments: PaymentRepository,
    alerts: AlertRepository,
}

impl PgAlertStore {
    /// Build a store whose repositories share `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            settings: AlertSettingsRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool),
        }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn get_settings(&self, owner: UserId) -> AppResult<Option<AlertSettings>> {
        self.settings.find(owner).await
    }

    async fn upsert_settings(&self, owner: UserId, settings: &AlertSettings) -> AppResult<()> {
        self.settings.upsert(owner, settings).await
    }

    async fn list_open_projects(&self, owner: UserId) -> AppResult<Vec<ProjectDeadline>> {
        self.projects.find_open_with_deadline(owner).await
    }

    async fn list_open_tasks(&self, owner: UserId) -> AppResult<Vec<TaskDue>> {
        self.tasks.find_open_with_due_date(owner).await
    }

    async fn list_pending_payments(&self, owner: UserId) -> AppResult<Vec<PendingPayment>> {
        self.payments.find_pending(owner).await
    }

    async fn list_emitted_triples(&self, owner: UserId) -> AppResult<HashSet<AlertTriple>> {
        self.alerts.find_emitted_triples(owner).await
    }

    async fn insert_alerts(&self, owner: UserId, candidates: &[AlertCandidate]) -> AppResult<usize> {
        let inserted = self.alerts.insert_batch(owner, candidates).await?;
        Ok(inserted as usize)
    }
}

#[async_trait]
impl AlertInbox for PgAlertStore {
    async fn list_alerts(&self, owner: UserId, page: &PageRequest) -> AppResult<PageResponse<Alert>> {
        self.alerts.find_by_user(owner, page).await
    }

    async fn count_unread(&self, owner: UserId) -> AppResult<u64> {
        self.alerts.count_unread(owner).await
    }

    async fn mark_read(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        self.alerts.mark_read(owner, alert_id).await
    }

    async fn mark_all_read(&self, owner: UserId) -> AppResult<u64> {
        self.alerts.mark_all_read(owner).await
    }

    async fn delete_alert(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        self.alerts.delete(owner, alert_id).await
    }
}
