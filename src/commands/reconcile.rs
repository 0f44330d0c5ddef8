//! One-shot reconciliation command.

use clap::Args;
use serde::Serialize;

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::types::UserId;
use studiodesk_service::ReconcileOutcome;

use crate::output::{self, OutputFormat};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Owner to reconcile
    #[arg(long)]
    pub owner: UserId,
}

#[derive(Debug, Serialize)]
struct OutcomeView {
    owner: UserId,
    status: &'static str,
    phase: Option<String>,
    candidates: Option<usize>,
    emitted: usize,
    default_settings: Option<bool>,
    scan_failures: Vec<String>,
    error: Option<String>,
}

impl OutcomeView {
    fn new(owner: UserId, outcome: &ReconcileOutcome) -> Self {
        let mut view = Self {
            owner,
            status: "completed",
            phase: None,
            candidates: None,
            emitted: outcome.emitted(),
            default_settings: None,
            scan_failures: Vec::new(),
            error: None,
        };
        match outcome {
            ReconcileOutcome::Completed(report) => {
                view.candidates = Some(report.candidates);
                view.default_settings = Some(!report.settings_persisted);
                view.scan_failures = report
                    .scan_failures
                    .iter()
                    .map(|f| format!("{}: {}", f.scanner, f.error))
                    .collect();
            }
            ReconcileOutcome::Skipped => view.status = "skipped",
            ReconcileOutcome::Cancelled { phase } => {
                view.status = "cancelled";
                view.phase = Some(phase.to_string());
            }
            ReconcileOutcome::Aborted { phase, error } => {
                view.status = "aborted";
                view.phase = Some(phase.to_string());
                view.error = Some(error.to_string());
            }
        }
        view
    }
}

/// Run one pass and print the outcome. An aborted run is reported as an
/// error so the exit status reflects it.
pub async fn execute(
    args: &ReconcileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (pool, store) = super::connect_store(config).await?;
    let reconciler = super::build_reconciler(store);

    let outcome = reconciler.reconcile_now(args.owner).await;
    pool.close().await;

    match format {
        OutputFormat::Json => output::print_json(&OutcomeView::new(args.owner, &outcome)),
        OutputFormat::Text => println!("Reconciliation {}", outcome),
    }

    match outcome {
        ReconcileOutcome::Aborted { error, .. } => Err(error),
        _ => Ok(()),
    }
}
