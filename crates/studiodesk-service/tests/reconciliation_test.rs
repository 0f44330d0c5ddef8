//! End-to-end reconciliation over the in-memory store.

mod helpers;

use std::collections::HashSet;
use std::time::Duration;

use studiodesk_database::{AlertStore, StoreOp};
use studiodesk_entity::alert::{AlertKind, AlertSettings};
use studiodesk_service::alerts::ScannerKind;
use studiodesk_service::{ReconcileOutcome, ReconcilePhase};

use helpers::TestApp;

#[tokio::test]
async fn test_second_run_emits_nothing() {
    let app = TestApp::new();
    app.add_project("Annual report", 3).await;
    app.add_task("Draft copy", -1).await;
    app.add_payment(45).await;

    let first = app.reconciler.reconcile_now(app.owner).await;
    assert_eq!(first.emitted(), 3);

    let second = app.reconciler.reconcile_now(app.owner).await;
    let report = second.report().unwrap();
    assert_eq!(report.candidates, 3);
    assert_eq!(report.emitted, 0);
    assert_eq!(app.alerts().await.len(), 3);
}

#[tokio::test]
async fn test_exact_lead_time_match() {
    let app = TestApp::new();
    let project = app.add_project("Packaging", 3).await;

    app.reconciler.reconcile_now(app.owner).await;

    assert_eq!(
        app.alerts().await,
        vec![(project, AlertKind::DeadlineWarning { lead_days: 3 })]
    );
}

#[tokio::test]
async fn test_overdue_only_for_past_deadline() {
    let app = TestApp::new();
    let project = app.add_project("Signage", -1).await;

    app.reconciler.reconcile_now(app.owner).await;

    assert_eq!(app.alerts().await, vec![(project, AlertKind::DeadlineOverdue)]);
}

#[tokio::test]
async fn test_default_settings_used_and_not_written() {
    let app = TestApp::new();
    app.add_project("Menu", 7).await;

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    let report = outcome.report().unwrap();
    assert!(!report.settings_persisted);
    assert_eq!(report.emitted, 1);

    assert!(!app.store.has_stored_settings(app.owner).await);
    assert!(!app.store.calls().await.contains(&StoreOp::UpsertSettings));
}

#[tokio::test]
async fn test_deadline_today_emits_one_urgent() {
    let app = TestApp::new();
    let project = app.add_project("Launch site", 0).await;

    app.reconciler.reconcile_now(app.owner).await;

    assert_eq!(app.alerts().await, vec![(project, AlertKind::DeadlineUrgent)]);
}

#[tokio::test]
async fn test_payment_aging_boundary() {
    let app = TestApp::new();
    let old = app.add_payment(31).await;
    app.add_payment(29).await;

    app.reconciler.reconcile_now(app.owner).await;

    assert_eq!(app.alerts().await, vec![(old, AlertKind::PaymentAging)]);
}

#[tokio::test]
async fn test_new_project_alerts_on_next_run() {
    let app = TestApp::new();
    app.add_project("Poster", 1).await;
    app.reconciler.reconcile_now(app.owner).await;

    let added = app.add_project("Flyer", 7).await;
    let outcome = app.reconciler.reconcile_now(app.owner).await;

    assert_eq!(outcome.emitted(), 1);
    let alerts = app.alerts().await;
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1], (added, AlertKind::DeadlineWarning { lead_days: 7 }));
}

#[tokio::test]
async fn test_each_lead_time_fires_once_as_days_pass() {
    let app = TestApp::new();
    let project = app.add_project("Exhibition", 8).await;
    let task = app.add_task("Print run", 4).await;

    for _ in 0..12 {
        app.reconciler.reconcile_now(app.owner).await;
        app.clock.advance_days(1);
    }

    let alerts = app.alerts().await;
    let unique: HashSet<_> = alerts.iter().copied().collect();
    assert_eq!(unique.len(), alerts.len());

    let project_kinds: Vec<_> = alerts
        .iter()
        .filter(|(id, _)| *id == project)
        .map(|(_, kind)| *kind)
        .collect();
    assert_eq!(
        project_kinds,
        vec![
            AlertKind::DeadlineWarning { lead_days: 7 },
            AlertKind::DeadlineWarning { lead_days: 3 },
            AlertKind::DeadlineUrgent,
            AlertKind::DeadlineOverdue,
        ]
    );

    let task_kinds: Vec<_> = alerts
        .iter()
        .filter(|(id, _)| *id == task)
        .map(|(_, kind)| *kind)
        .collect();
    assert_eq!(
        task_kinds,
        vec![
            AlertKind::TaskDueSoon { lead_days: 3 },
            AlertKind::TaskDueSoon { lead_days: 1 },
            AlertKind::TaskOverdue,
        ]
    );
}

#[tokio::test]
async fn test_partial_scan_failure_keeps_other_scanners() {
    let app = TestApp::new();
    let project = app.add_project("Rebrand", 3).await;
    let task = app.add_task("Moodboard", 1).await;
    app.store.fail(StoreOp::ListOpenTasks).await;

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    let report = outcome.report().unwrap();
    assert!(report.is_partial());
    assert_eq!(report.scan_failures.len(), 1);
    assert_eq!(report.scan_failures[0].scanner, ScannerKind::TaskDue);
    assert_eq!(
        app.alerts().await,
        vec![(project, AlertKind::DeadlineWarning { lead_days: 3 })]
    );

    app.store.heal(StoreOp::ListOpenTasks).await;
    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert_eq!(outcome.emitted(), 1);
    assert_eq!(
        app.alerts().await[1],
        (task, AlertKind::TaskDueSoon { lead_days: 1 })
    );
}

#[tokio::test]
async fn test_partial_emit_heals_on_next_run() {
    let app = TestApp::new();
    app.add_project("Catalogue", -2).await;
    app.add_task("Proofread", -1).await;
    app.add_payment(60).await;

    app.store.cap_inserts(Some(1)).await;
    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert!(matches!(
        outcome,
        ReconcileOutcome::Aborted { phase: ReconcilePhase::Emitting, .. }
    ));
    assert_eq!(app.alerts().await.len(), 1);

    app.store.cap_inserts(None).await;
    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert_eq!(outcome.emitted(), 2);

    let alerts = app.alerts().await;
    let unique: HashSet<_> = alerts.iter().copied().collect();
    assert_eq!(alerts.len(), 3);
    assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn test_deleted_alert_is_not_emitted_again() {
    use studiodesk_database::AlertInbox;

    let app = TestApp::new();
    app.add_project("Website", -3).await;
    app.reconciler.reconcile_now(app.owner).await;

    let alert_id = app.store.alerts_for(app.owner).await[0].id;
    assert!(app.store.delete_alert(app.owner, alert_id).await.unwrap());

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert_eq!(outcome.emitted(), 0);
    assert!(app.alerts().await.is_empty());
}

#[tokio::test]
async fn test_storage_unavailable_aborts_and_next_run_recovers() {
    let app = TestApp::new();
    app.add_project("Lookbook", 1).await;
    app.store.fail(StoreOp::ListEmittedTriples).await;

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    match &outcome {
        ReconcileOutcome::Aborted { phase, error } => {
            assert_eq!(*phase, ReconcilePhase::Deduping);
            assert!(error.is_transient());
        }
        other => panic!("expected abort, got {other}"),
    }
    assert!(app.alerts().await.is_empty());

    app.store.heal(StoreOp::ListEmittedTriples).await;
    assert_eq!(app.reconciler.reconcile_now(app.owner).await.emitted(), 1);
}

#[tokio::test]
async fn test_ledger_read_after_scans_and_before_insert() {
    let app = TestApp::new();
    app.add_project("Banner", 3).await;
    app.add_payment(40).await;

    app.reconciler.reconcile_now(app.owner).await;

    let calls = app.store.calls().await;
    let position = |op| calls.iter().position(|c| *c == op).unwrap();
    let ledger = position(StoreOp::ListEmittedTriples);
    assert_eq!(position(StoreOp::GetSettings), 0);
    assert!(position(StoreOp::ListOpenProjects) < ledger);
    assert!(position(StoreOp::ListOpenTasks) < ledger);
    assert!(position(StoreOp::ListPendingPayments) < ledger);
    assert!(ledger < position(StoreOp::InsertAlerts));
}

#[tokio::test]
async fn test_nothing_due_skips_ledger_and_insert() {
    let app = TestApp::new();
    app.add_project("Brochure", 30).await;

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert_eq!(outcome.report().unwrap().candidates, 0);

    let calls = app.store.calls().await;
    assert!(!calls.contains(&StoreOp::ListEmittedTriples));
    assert!(!calls.contains(&StoreOp::InsertAlerts));
}

#[tokio::test]
async fn test_stored_settings_drive_project_windows() {
    let app = TestApp::new();
    app.store
        .upsert_settings(app.owner, &AlertSettings::new([14], false))
        .await
        .unwrap();
    let project = app.add_project("Annual gala", 14).await;
    app.add_project("Trade fair", 7).await;
    app.add_payment(90).await;

    let outcome = app.reconciler.reconcile_now(app.owner).await;
    assert!(outcome.report().unwrap().settings_persisted);
    assert_eq!(
        app.alerts().await,
        vec![(project, AlertKind::DeadlineWarning { lead_days: 14 })]
    );
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_trigger_is_dropped() {
    let app = TestApp::new();
    app.add_project("Video edit", 1).await;
    app.store.set_read_delay(Some(Duration::from_secs(2))).await;

    let first = {
        let reconciler = app.reconciler.clone();
        let owner = app.owner;
        tokio::spawn(async move { reconciler.reconcile_now(owner).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.reconciler.in_flight().is_in_flight(app.owner));

    let second = app.reconciler.reconcile_now(app.owner).await;
    assert!(matches!(second, ReconcileOutcome::Skipped));

    let first = first.await.unwrap();
    assert_eq!(first.emitted(), 1);
    assert!(!app.reconciler.in_flight().is_in_flight(app.owner));

    // Another owner is never blocked by the first.
    let other = app.reconciler.reconcile_now(studiodesk_core::types::UserId::new()).await;
    assert!(other.is_completed());
}
