//! Reconciliation orchestrator.
//!
//! Composes the settings resolver, the three scanners, the dedup filter and
//! the emitter into one pass per owner.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use studiodesk_core::result::AppResult;
use studiodesk_core::traits::Clock;
use studiodesk_core::types::UserId;
use studiodesk_database::AlertStore;
use studiodesk_entity::alert::{AlertCandidate, AlertSettings};

use super::dedup::DedupFilter;
use super::emitter::Emitter;
use super::outcome::{ReconcileOutcome, ReconcilePhase, ReconcileReport};
use super::scanner::{self, ScanFailure, ScannerKind};
use super::settings::SettingsResolver;
use super::single_flight::InFlightRegistry;

/// Runs alert reconciliation passes, at most one in flight per owner.
#[derive(Clone)]
pub struct AlertReconciler {
    /// Entity and ledger storage.
    store: Arc<dyn AlertStore>,
    /// Source of "today".
    clock: Arc<dyn Clock>,
    settings: SettingsResolver,
    dedup: DedupFilter,
    emitter: Emitter,
    /// Owners with a run in flight.
    in_flight: InFlightRegistry,
}

impl std::fmt::Debug for AlertReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertReconciler")
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl AlertReconciler {
    /// Creates a new reconciler.
    pub fn new(store: Arc<dyn AlertStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: SettingsResolver::new(Arc::clone(&store)),
            dedup: DedupFilter::new(Arc::clone(&store)),
            emitter: Emitter::new(Arc::clone(&store)),
            store,
            clock,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Settings resolver sharing this reconciler's store.
    pub fn settings(&self) -> &SettingsResolver {
        &self.settings
    }

    /// Owners with a run in flight.
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Run one pass for `owner` now.
    pub async fn reconcile_now(&self, owner: UserId) -> ReconcileOutcome {
        self.reconcile_until_cancelled(owner, &CancellationToken::new())
            .await
    }

    /// Run one pass for `owner`, stopping at the next phase boundary once
    /// `cancel` fires. A storage call already started is allowed to finish.
    ///
    /// If a run for `owner` is already in flight this returns
    /// [`ReconcileOutcome::Skipped`] without touching storage.
    pub async fn reconcile_until_cancelled(
        &self,
        owner: UserId,
        cancel: &CancellationToken,
    ) -> ReconcileOutcome {
        let Some(_guard) = self.in_flight.try_acquire(owner) else {
            warn!(owner = %owner, "Reconciliation already in flight, dropping trigger");
            return ReconcileOutcome::Skipped;
        };

        let outcome = self.run(owner, cancel).await;

        match &outcome {
            ReconcileOutcome::Completed(report) => {
                info!(
                    owner = %owner,
                    today = %report.today,
                    candidates = report.candidates,
                    emitted = report.emitted,
                    scan_failures = report.scan_failures.len(),
                    "Reconciliation completed"
                );
            }
            ReconcileOutcome::Cancelled { phase } => {
                info!(owner = %owner, phase = %phase, "Reconciliation cancelled");
            }
            ReconcileOutcome::Aborted { phase, error } => {
                error!(
                    owner = %owner,
                    phase = %phase,
                    error = %error,
                    transient = error.is_transient(),
                    "Reconciliation aborted"
                );
            }
            ReconcileOutcome::Skipped => {}
        }
        debug!(owner = %owner, phase = %ReconcilePhase::Idle, "Reconciliation phase");

        outcome
    }

    async fn run(&self, owner: UserId, cancel: &CancellationToken) -> ReconcileOutcome {
        let today = self.clock.today();

        let phase = ReconcilePhase::ResolvingSettings;
        if let Some(cancelled) = enter(owner, phase, cancel) {
            return cancelled;
        }
        let resolved = match self.settings.resolve(owner).await {
            Ok(resolved) => resolved,
            Err(error) => return ReconcileOutcome::Aborted { phase, error },
        };

        let phase = ReconcilePhase::Scanning;
        if let Some(cancelled) = enter(owner, phase, cancel) {
            return cancelled;
        }
        let scan = self.scan(owner, today, &resolved.settings).await;
        if scan.attempted > 0 && scan.failures.len() == scan.attempted {
            let error = scan.failures[0].error.clone();
            return ReconcileOutcome::Aborted { phase, error };
        }
        let candidate_count = scan.candidates.len();

        let phase = ReconcilePhase::Deduping;
        if let Some(cancelled) = enter(owner, phase, cancel) {
            return cancelled;
        }
        let fresh = match self.dedup.filter(owner, scan.candidates).await {
            Ok(fresh) => fresh,
            Err(error) => return ReconcileOutcome::Aborted { phase, error },
        };

        let phase = ReconcilePhase::Emitting;
        if let Some(cancelled) = enter(owner, phase, cancel) {
            return cancelled;
        }
        let emitted = match self.emitter.emit(owner, &fresh).await {
            Ok(emitted) => emitted,
            Err(error) => return ReconcileOutcome::Aborted { phase, error },
        };

        ReconcileOutcome::Completed(ReconcileReport {
            owner,
            today,
            settings_persisted: resolved.persisted,
            candidates: candidate_count,
            emitted,
            scan_failures: scan.failures,
        })
    }

    /// Read all sources concurrently and run the scanners on whatever
    /// succeeded. Payments are not read when aging alerts are off.
    async fn scan(&self, owner: UserId, today: NaiveDate, settings: &AlertSettings) -> ScanResult {
        let payments = async {
            if settings.payment_aging {
                Some(self.store.list_pending_payments(owner).await)
            } else {
                None
            }
        };

        let (projects, tasks, payments) = tokio::join!(
            self.store.list_open_projects(owner),
            self.store.list_open_tasks(owner),
            payments,
        );

        let mut result = ScanResult::default();
        result.collect(owner, ScannerKind::ProjectDeadline, projects, |p| {
            scanner::scan_projects(today, settings, &p)
        });
        result.collect(owner, ScannerKind::TaskDue, tasks, |t| {
            scanner::scan_tasks(today, &t)
        });
        if let Some(payments) = payments {
            result.collect(owner, ScannerKind::PaymentAging, payments, |p| {
                scanner::scan_payments(today, settings, &p)
            });
        }
        result
    }
}

#[derive(Default)]
struct ScanResult {
    attempted: usize,
    candidates: Vec<AlertCandidate>,
    failures: Vec<ScanFailure>,
}

impl ScanResult {
    fn collect<T>(
        &mut self,
        owner: UserId,
        kind: ScannerKind,
        read: AppResult<T>,
        scan: impl FnOnce(T) -> Vec<AlertCandidate>,
    ) {
        self.attempted += 1;
        match read {
            Ok(entities) => {
                let found = scan(entities);
                debug!(owner = %owner, scanner = %kind, candidates = found.len(), "Scanner finished");
                self.candidates.extend(found);
            }
            Err(error) => {
                warn!(owner = %owner, scanner = %kind, error = %error, "Scanner read failed, continuing without it");
                self.failures.push(ScanFailure {
                    scanner: kind,
                    error,
                });
            }
        }
    }
}

/// Log entry into `phase`, or stop if the owner's session has ended.
fn enter(owner: UserId, phase: ReconcilePhase, cancel: &CancellationToken) -> Option<ReconcileOutcome> {
    if cancel.is_cancelled() {
        return Some(ReconcileOutcome::Cancelled { phase });
    }
    debug!(owner = %owner, phase = %phase, "Reconciliation phase");
    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Duration as Days;
    use uuid::Uuid;

    use studiodesk_core::traits::FixedClock;
    use studiodesk_database::{MemoryAlertStore, StoreOp};
    use studiodesk_entity::alert::AlertKind;
    use studiodesk_entity::project::{ProjectDeadline, ProjectStatus};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn setup() -> (MemoryAlertStore, AlertReconciler) {
        let store = MemoryAlertStore::new();
        let reconciler =
            AlertReconciler::new(Arc::new(store.clone()), Arc::new(FixedClock::new(today())));
        (store, reconciler)
    }

    async fn add_project(store: &MemoryAlertStore, owner: UserId, offset: i64) {
        store
            .put_project(ProjectDeadline {
                id: Uuid::new_v4(),
                user_id: owner,
                name: "Catalogue".to_string(),
                deadline: Some(today() + Days::days(offset)),
                status: ProjectStatus::InProgress,
            })
            .await;
    }

    #[tokio::test]
    async fn test_settings_failure_aborts_before_scanning() {
        let (store, reconciler) = setup();
        store.fail(StoreOp::GetSettings).await;

        let outcome = reconciler.reconcile_now(UserId::new()).await;
        assert!(matches!(
            outcome,
            ReconcileOutcome::Aborted { phase: ReconcilePhase::ResolvingSettings, .. }
        ));
        assert_eq!(store.calls().await, vec![StoreOp::GetSettings]);
    }

    #[tokio::test]
    async fn test_all_scanners_failing_aborts() {
        let (store, reconciler) = setup();
        store.fail(StoreOp::ListOpenProjects).await;
        store.fail(StoreOp::ListOpenTasks).await;
        store.fail(StoreOp::ListPendingPayments).await;

        let outcome = reconciler.reconcile_now(UserId::new()).await;
        assert!(matches!(
            outcome,
            ReconcileOutcome::Aborted { phase: ReconcilePhase::Scanning, .. }
        ));
        assert!(!store.calls().await.contains(&StoreOp::InsertAlerts));
    }

    #[tokio::test]
    async fn test_payments_not_read_when_aging_disabled() {
        let (store, reconciler) = setup();
        let owner = UserId::new();
        store
            .upsert_settings(owner, &AlertSettings::new([1, 3, 7], false))
            .await
            .unwrap();
        add_project(&store, owner, 7).await;

        let outcome = reconciler.reconcile_now(owner).await;
        let report = outcome.report().unwrap();
        assert!(report.settings_persisted);
        assert_eq!(report.emitted, 1);
        assert!(!store.calls().await.contains(&StoreOp::ListPendingPayments));
        assert_eq!(
            store.alerts_for(owner).await[0].kind,
            AlertKind::DeadlineWarning { lead_days: 7 }
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_phase() {
        let (store, reconciler) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = reconciler
            .reconcile_until_cancelled(UserId::new(), &cancel)
            .await;
        assert!(matches!(
            outcome,
            ReconcileOutcome::Cancelled { phase: ReconcilePhase::ResolvingSettings }
        ));
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_finishes_current_read() {
        let (store, reconciler) = setup();
        let owner = UserId::new();
        add_project(&store, owner, 1).await;
        store.set_read_delay(Some(Duration::from_secs(5))).await;

        let cancel = CancellationToken::new();
        let run = {
            let reconciler = reconciler.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { reconciler.reconcile_until_cancelled(owner, &cancel).await })
        };

        // Let the settings read start, then end the session during it.
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let outcome = run.await.unwrap();
        assert!(matches!(
            outcome,
            ReconcileOutcome::Cancelled { phase: ReconcilePhase::Scanning }
        ));
        assert_eq!(store.calls().await, vec![StoreOp::GetSettings]);
        assert!(!reconciler.in_flight().is_in_flight(owner));
    }
}
