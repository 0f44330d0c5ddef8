//! Cron scheduler for periodic alert reconciliation.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use studiodesk_core::config::ReconcilerConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::types::UserId;
use studiodesk_service::{AlertReconciler, ReconcileOutcome};

use crate::sessions::SessionRegistry;

/// Fires reconciliation for every active session on a cron schedule, and
/// once when a session starts.
pub struct AlertScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Owners with an active session
    sessions: SessionRegistry,
    config: ReconcilerConfig,
    started: AtomicBool,
}

impl std::fmt::Debug for AlertScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertScheduler")
            .field("schedule", &self.config.schedule)
            .field("active_sessions", &self.sessions.active().len())
            .finish()
    }
}

impl AlertScheduler {
    /// Create a new alert scheduler
    pub async fn new(reconciler: AlertReconciler, config: ReconcilerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            sessions: SessionRegistry::new(reconciler),
            config,
            started: AtomicBool::new(false),
        })
    }

    /// Register the periodic tick and start the scheduler. Does nothing
    /// when periodic reconciliation is disabled.
    pub async fn start(&self) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!("Periodic alert reconciliation disabled");
            return Ok(());
        }

        self.register_tick().await?;
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;
        self.started.store(true, Ordering::SeqCst);

        tracing::info!("Alert scheduler started");
        Ok(())
    }

    /// End every session, stop the cron tick and wait for spawned runs to
    /// return. Storage can be closed once this resolves.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sessions.end_all();

        if self.started.swap(false, Ordering::SeqCst) {
            let mut scheduler = self.scheduler.clone();
            scheduler
                .shutdown()
                .await
                .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;
        }

        self.sessions.drain().await;
        tracing::info!("Alert scheduler shut down");
        Ok(())
    }

    /// Register `owner` for periodic runs. Returns the immediate run when
    /// `run_on_session_start` is set.
    pub fn start_session(&self, owner: UserId) -> Option<JoinHandle<ReconcileOutcome>> {
        self.sessions.register(owner);
        if self.config.run_on_session_start {
            self.sessions.trigger(owner)
        } else {
            None
        }
    }

    /// Deregister `owner` and cancel its runs.
    pub fn end_session(&self, owner: UserId) -> bool {
        self.sessions.end(owner)
    }

    /// Fire the periodic trigger now, outside the cron schedule.
    pub fn tick(&self) -> Vec<JoinHandle<ReconcileOutcome>> {
        self.sessions.trigger_all()
    }

    /// Owners with an active session.
    pub fn active_sessions(&self) -> Vec<UserId> {
        self.sessions.active()
    }

    /// Reconciliation runs not yet finished.
    pub fn running(&self) -> usize {
        self.sessions.running()
    }

    /// Reconciliation tick, on `reconciler.schedule`
    async fn register_tick(&self) -> Result<(), AppError> {
        let sessions = self.sessions.clone();
        let job = CronJob::new_async(self.config.schedule.as_str(), move |_uuid, _lock| {
            let sessions = sessions.clone();
            Box::pin(async move {
                let runs = sessions.trigger_all();
                tracing::debug!(owners = runs.len(), "Alert reconciliation tick fired");
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid reconciler schedule '{}': {}",
                self.config.schedule, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add alert reconciliation schedule: {}", e))
        })?;

        tracing::info!(schedule = %self.config.schedule, "Registered: alert_reconciliation");
        Ok(())
    }
}
