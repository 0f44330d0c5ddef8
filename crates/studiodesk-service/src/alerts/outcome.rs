//! Result types of a reconciliation run.

use std::fmt;

use chrono::NaiveDate;

use studiodesk_core::error::AppError;
use studiodesk_core::types::UserId;

use super::scanner::ScanFailure;

/// Phases of a single run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcilePhase {
    /// Not running.
    Idle,
    /// Loading the owner's alert settings.
    ResolvingSettings,
    /// Reading entities and computing candidates.
    Scanning,
    /// Filtering candidates against the emission ledger.
    Deduping,
    /// Writing new alerts.
    Emitting,
}

impl ReconcilePhase {
    /// Return the phase as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingSettings => "resolving_settings",
            Self::Scanning => "scanning",
            Self::Deduping => "deduping",
            Self::Emitting => "emitting",
        }
    }
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a run that reached the end.
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// Owner the run was for.
    pub owner: UserId,
    /// Date the windows were computed against.
    pub today: NaiveDate,
    /// Whether the settings came from storage rather than defaults.
    pub settings_persisted: bool,
    /// Candidates produced by the scanners, before dedup.
    pub candidates: usize,
    /// Alerts written.
    pub emitted: usize,
    /// Scanners skipped because their read failed.
    pub scan_failures: Vec<ScanFailure>,
}

impl ReconcileReport {
    /// Whether any scanner failed.
    pub fn is_partial(&self) -> bool {
        !self.scan_failures.is_empty()
    }
}

/// How a run ended. Runs never fail the caller; storage errors surface here.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The run went through every phase.
    Completed(ReconcileReport),
    /// Another run for the same owner was in flight; this trigger was dropped.
    Skipped,
    /// The owner's session ended; the run stopped before `phase`.
    Cancelled {
        /// Phase that was not started.
        phase: ReconcilePhase,
    },
    /// A storage step failed; retried on the next trigger.
    Aborted {
        /// Phase that failed.
        phase: ReconcilePhase,
        /// The failure.
        error: AppError,
    },
}

impl ReconcileOutcome {
    /// The report, if the run completed.
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// Alerts written by this run; zero unless it completed.
    pub fn emitted(&self) -> usize {
        self.report().map_or(0, |r| r.emitted)
    }

    /// Whether the run completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(report) => {
                write!(
                    f,
                    "completed for {} on {}: {} candidates, {} emitted",
                    report.owner, report.today, report.candidates, report.emitted
                )?;
                if !report.settings_persisted {
                    f.write_str(" (default settings)")?;
                }
                for failure in &report.scan_failures {
                    write!(f, "; {} scanner failed: {}", failure.scanner, failure.error)?;
                }
                Ok(())
            }
            Self::Skipped => f.write_str("skipped: a run is already in flight"),
            Self::Cancelled { phase } => write!(f, "cancelled before {phase}"),
            Self::Aborted { phase, error } => write!(f, "aborted during {phase}: {error}"),
        }
    }
}
