//! Storage abstraction consumed by the alert reconciliation engine.
//!
//! Two implementations are provided:
//! - [`PgAlertStore`], backed by the PostgreSQL repositories
//! - [`MemoryAlertStore`], a single-process store used by tests and local runs

pub mod memory;
pub mod postgres;

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::pagination::{PageRequest, PageResponse};
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_entity::alert::{Alert, AlertCandidate, AlertSettings, AlertTriple};
use studiodesk_entity::payment::PendingPayment;
use studiodesk_entity::project::ProjectDeadline;
use studiodesk_entity::task::TaskDue;

pub use memory::MemoryAlertStore;
pub use postgres::PgAlertStore;

/// One operation of [`AlertStore`], used for logging and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`AlertStore::get_settings`]
    GetSettings,
    /// [`AlertStore::upsert_settings`]
    UpsertSettings,
    /// [`AlertStore::list_open_projects`]
    ListOpenProjects,
    /// [`AlertStore::list_open_tasks`]
    ListOpenTasks,
    /// [`AlertStore::list_pending_payments`]
    ListPendingPayments,
    /// [`AlertStore::list_emitted_triples`]
    ListEmittedTriples,
    /// [`AlertStore::insert_alerts`]
    InsertAlerts,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetSettings => "get_settings",
            Self::UpsertSettings => "upsert_settings",
            Self::ListOpenProjects => "list_open_projects",
            Self::ListOpenTasks => "list_open_tasks",
            Self::ListPendingPayments => "list_pending_payments",
            Self::ListEmittedTriples => "list_emitted_triples",
            Self::InsertAlerts => "insert_alerts",
        };
        f.write_str(name)
    }
}

/// Everything the reconciliation engine reads and writes.
///
/// All methods are scoped to a single owner; implementations never need
/// cross-owner coordination.
#[async_trait]
pub trait AlertStore: Send + Sync + 'static {
    /// Stored settings, or `None` if the user never saved any.
    async fn get_settings(&self, owner: UserId) -> AppResult<Option<AlertSettings>>;

    /// Explicitly persist settings. Only called on user action.
    async fn upsert_settings(&self, owner: UserId, settings: &AlertSettings) -> AppResult<()>;

    /// Projects not completed/cancelled that have a deadline.
    async fn list_open_projects(&self, owner: UserId) -> AppResult<Vec<ProjectDeadline>>;

    /// Tasks not completed/cancelled that have a due date.
    async fn list_open_tasks(&self, owner: UserId) -> AppResult<Vec<TaskDue>>;

    /// Payments whose status is pending.
    async fn list_pending_payments(&self, owner: UserId) -> AppResult<Vec<PendingPayment>>;

    /// Every triple ever emitted for the owner.
    async fn list_emitted_triples(&self, owner: UserId) -> AppResult<HashSet<AlertTriple>>;

    /// Persist candidates as alerts in one batch. Returns how many were
    /// written. A triple that is already in the ledger is never written
    /// twice, even if the caller passes it again.
    async fn insert_alerts(&self, owner: UserId, candidates: &[AlertCandidate]) -> AppResult<usize>;
}

/// Read/mark/delete access to emitted alerts, used by the inbox.
///
/// Deleting an alert never touches the emission ledger.
#[async_trait]
pub trait AlertInbox: Send + Sync + 'static {
    /// Alerts for the owner, newest first.
    async fn list_alerts(&self, owner: UserId, page: &PageRequest) -> AppResult<PageResponse<Alert>>;

    /// Number of unread alerts.
    async fn count_unread(&self, owner: UserId) -> AppResult<u64>;

    /// Mark one alert read. `false` if the owner has no such alert.
    async fn mark_read(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool>;

    /// Mark every alert read; returns how many changed.
    async fn mark_all_read(&self, owner: UserId) -> AppResult<u64>;

    /// Delete one alert. `false` if the owner has no such alert.
    async fn delete_alert(&self, owner: UserId, alert_id: AlertId) -> AppResult<bool>;
}
