//! Owners with an active session and the reconciliation runs spawned for
//! them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use studiodesk_core::types::UserId;
use studiodesk_service::{AlertReconciler, ReconcileOutcome};

/// Registered owners, each with a token that ends its runs.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    reconciler: AlertReconciler,
    sessions: Arc<DashMap<UserId, CancellationToken>>,
    /// Every spawned run, whether or not its handle was kept.
    runs: TaskTracker,
}

impl SessionRegistry {
    /// Creates an empty registry driving `reconciler`.
    pub fn new(reconciler: AlertReconciler) -> Self {
        Self {
            reconciler,
            sessions: Arc::new(DashMap::new()),
            runs: TaskTracker::new(),
        }
    }

    /// Register `owner`. Starting a session that is already active keeps
    /// the existing token.
    pub fn register(&self, owner: UserId) -> CancellationToken {
        let token = self.sessions.entry(owner).or_default().value().clone();
        info!(owner = %owner, "Alert session started");
        token
    }

    /// Deregister `owner` and cancel its runs. An in-flight run stops at its
    /// next phase boundary. Returns `false` if no session was active.
    pub fn end(&self, owner: UserId) -> bool {
        match self.sessions.remove(&owner) {
            Some((_, token)) => {
                token.cancel();
                info!(owner = %owner, "Alert session ended");
                true
            }
            None => false,
        }
    }

    /// Spawn one reconciliation for `owner` under its session token.
    /// `None` if the owner has no active session.
    pub fn trigger(&self, owner: UserId) -> Option<JoinHandle<ReconcileOutcome>> {
        let token = self.sessions.get(&owner)?.value().clone();
        Some(self.spawn(owner, token))
    }

    /// Spawn one reconciliation per registered owner.
    pub fn trigger_all(&self) -> Vec<JoinHandle<ReconcileOutcome>> {
        let targets: Vec<(UserId, CancellationToken)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        debug!(owners = targets.len(), "Reconciliation tick");
        targets
            .into_iter()
            .map(|(owner, token)| self.spawn(owner, token))
            .collect()
    }

    /// Owners with an active session.
    pub fn active(&self) -> Vec<UserId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Whether `owner` has an active session.
    pub fn is_active(&self, owner: UserId) -> bool {
        self.sessions.contains_key(&owner)
    }

    /// End every session.
    pub fn end_all(&self) {
        for owner in self.active() {
            self.end(owner);
        }
    }

    /// Runs spawned and not yet finished.
    pub fn running(&self) -> usize {
        self.runs.len()
    }

    /// Wait for every spawned run to finish. Runs of ended sessions return
    /// at their next phase boundary.
    pub async fn drain(&self) {
        self.runs.close();
        let pending = self.runs.len();
        if pending > 0 {
            debug!(runs = pending, "Waiting for reconciliation runs");
        }
        self.runs.wait().await;
        self.runs.reopen();
    }

    fn spawn(&self, owner: UserId, token: CancellationToken) -> JoinHandle<ReconcileOutcome> {
        let reconciler = self.reconciler.clone();
        self.runs
            .spawn(async move { reconciler.reconcile_until_cancelled(owner, &token).await })
    }
}
