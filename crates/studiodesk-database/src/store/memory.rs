//! In-memory [`AlertStore`] using a Tokio mutex.
//!
//! Suitable for tests and single-process runs. Individual operations can be
//! made to fail, and reads can be slowed down, to exercise partial-failure
//! and overlap handling.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use studiodesk_core::error::AppError;
use studiodesk_core::result::AppResult;
use studiodesk_core::types::pagination::{PageRequest, PageResponse};
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_entity::alert::{Alert, AlertCandidate, AlertSettings, AlertTriple};
use studiodesk_entity::payment::{PaymentStatus, PendingPayment};
use studiodesk_entity::project::ProjectDeadline;
use studiodesk_entity::task::TaskDue;

use super::{AlertInbox, AlertStore, StoreOp};

#[derive(Debug, Default)]
struct InnerState {
    settings: HashMap<UserId, AlertSettings>,
    projects: Vec<ProjectDeadline>,
    tasks: Vec<TaskDue>,
    payments: Vec<PendingPayment>,
    alerts: Vec<Alert>,
    /// Append-only; deleting an alert does not remove its entry.
    ledger: HashSet<(UserId, AlertTriple)>,
    failing: HashSet<StoreOp>,
    /// Persist at most this many candidates per insert, then fail.
    insert_cap: Option<usize>,
    read_delay: Option<Duration>,
    calls: Vec<StoreOp>,
}

impl InnerState {
    fn enter(&mut self, op: StoreOp) -> AppResult<()> {
        self.calls.push(op);
        if self.failing.contains(&op) {
            return Err(AppError::service_unavailable(format!(
                "memory store: {op} is unavailable"
            )));
        }
        Ok(())
    }
}

/// In-memory alert store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAlertStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryAlertStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a project.
    pub async fn put_project(&self, project: ProjectDeadline) {
        let mut state = self.state.lock().await;
        state.projects.retain(|p| p.id != project.id);
        state.projects.push(project);
    }

    /// Add or replace a task.
    pub async fn put_task(&self, task: TaskDue) {
        let mut state = self.state.lock().await;
        state.tasks.retain(|t| t.id != task.id);
        state.tasks.push(task);
    }

    /// Add or replace a payment.
    pub async fn put_payment(&self, payment: PendingPayment) {
        let mut state = self.state.lock().await;
        state.payments.retain(|p| p.id != payment.id);
        state.payments.push(payment);
    }

    /// Alerts currently stored for `owner`, oldest first.
    pub async fn alerts_for(&self, owner: UserId) -> Vec<Alert> {
        let state = self.state.lock().await;
        state
            .alerts
            .iter()
            .filter(|a| a.user_id == owner)
            .cloned()
            .collect()
    }

    /// Whether settings were ever written for `owner`.
    pub async fn has_stored_settings(&self, owner: UserId) -> bool {
        self.state.lock().await.settings.contains_key(&owner)
    }

    /// Make `op` fail with a service-unavailable error until [`Self::heal`].
    pub async fn fail(&self, op: StoreOp) {
        self.state.lock().await.failing.insert(op);
    }

    /// Undo [`Self::fail`] for `op`.
    pub async fn heal(&self, op: StoreOp) {
        self.state.lock().await.failing.remove(&op);
    }

    /// Let the next inserts persist only the first `cap` candidates and then
    /// report failure. `None` restores normal behaviour.
    pub async fn cap_inserts(&self, cap: Option<usize>) {
        self.state.lock().await.insert_cap = cap;
    }

    /// Delay every read by `delay`.
    pub async fn set_read_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.read_delay = delay;
    }

    /// Operations invoked so far, in order.
    pub async fn calls(&self) -> Vec<StoreOp> {
        self.state.lock().await.calls.clone()
    }

    async fn read<T>(
        &self,
        op: StoreOp,
        f: impl FnOnce(&InnerState) -> T,
    ) -> AppResult<T> {
        let delay = {
            let mut state = self.state.lock().await;
            state.enter(op)?;
            state.read_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().await;
        Ok(f(&state))
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn get_settings(&self, owner: UserId) -> AppResult<Option<AlertSettings>> {
        self.read(StoreOp::GetSettings, |s| s.settings.get(&owner).cloned())
            .await
    }

    async fn upsert_settings(&self, owner: UserId, settings: &AlertSettings) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::UpsertSettings)?;
        state.settings.insert(owner, settings.clone());
        Ok(())
    }

    async fn list_open_projects(&self, owner: UserId) -> AppResult<Vec<ProjectDeadline>> {
        self.read(StoreOp::ListOpenProjects, |s| {
            s.projects
                .iter()
                .filter(|p| p.user_id == owner && p.open_deadline().is_some())
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_open_tasks(&self, owner: UserId) -> AppResult<Vec<TaskDue>> {
        self.read(StoreOp::ListOpenTasks, |s| {
            s.tasks
                .iter()
                .filter(|t| t.user_id == owner && t.open_due_date().is_some())
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_pending_payments(&self, owner: UserId) -> AppResult<Vec<PendingPayment>> {
        self.read(StoreOp::ListPendingPayments, |s| {
            s.payments
                .iter()
                .filter(|p| p.user_id == owner && p.status == PaymentStatus::Pending)
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_emitted_triples(&self, owner: UserId) -> AppResult<HashSet<AlertTriple>> {
        self.read(StoreOp::ListEmittedTriples, |s| {
            s.ledger
                .iter()
                .filter(|(user, _)| *user == owner)
                .map(|(_, triple)| *triple)
                .collect()
        })
        .await
    }

    async fn insert_alerts(&self, owner: UserId, candidates: &[AlertCandidate]) -> AppResult<usize> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::InsertAlerts)?;

        let cap = state.insert_cap.unwrap_or(usize::MAX);
        let now = Utc::now();
        let mut inserted = 0usize;

        for candidate in candidates.iter().take(cap) {
            if state.ledger.insert((owner, candidate.triple())) {
                state
                    .alerts
                    .push(Alert::from_candidate(owner, candidate.clone(), now));
                inserted += 1;
            }
        }

        debug!(owner = %owner, inserted, "memory store: alerts inserted");

        if candidates.len() > cap {
            return Err(AppError::service_unavailable(format!(
                "memory store: insert interrupted after {cap} of {} alerts",
                candidates.len()
            )));
        }
        Ok(inserted)
    }
}

#[async_trait]
impl AlertInbox for MemoryAlertStore {
    async fn list_alerts(&self, owner: UserId, page: &PageRequest) -> AppResult<PageResponse<Alert>> {
        let state = self.state.lock().await;
        let mut owned: Vec<&Alert> = state.alerts.iter().filter(|a| a.user_id == owner).collect();
        // Newest first; later inserts win timestamp ties.
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn count_unread(&self, owner: UserId) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .alerts
            .iter()
            .filter(|a| a.user_id == owner && !a.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .alerts
            .iter_mut()
            .find(|a| a.user_id == owner && a.id == alert_id)
        {
            Some(alert) => {
                if !alert.is_read {
                    alert.is_read = true;
                    alert.read_at = Some(Utc::now());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, owner: UserId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut changed = 0u64;
        for alert in state
            .alerts
            .iter_mut()
            .filter(|a| a.user_id == owner && !a.is_read)
        {
            alert.is_read = true;
            alert.read_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_alert(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.alerts.len();
        state
            .alerts
            .retain(|a| !(a.user_id == owner && a.id == alert_id));
        Ok(state.alerts.len() != before)
    }
}
