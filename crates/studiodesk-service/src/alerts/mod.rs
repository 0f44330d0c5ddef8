//! Deadline and payment alert reconciliation.
//!
//! One pass per owner: resolve settings, run the three scanners, drop
//! triples already in the emission ledger, write the rest.

pub mod dedup;
pub mod emitter;
pub mod outcome;
pub mod reconciler;
pub mod scanner;
pub mod settings;
pub mod single_flight;

pub use dedup::{DedupFilter, filter_unemitted};
pub use emitter::Emitter;
pub use outcome::{ReconcileOutcome, ReconcilePhase, ReconcileReport};
pub use reconciler::AlertReconciler;
pub use scanner::{ScanFailure, ScannerKind};
pub use settings::{AlertSettingsUpdate, ResolvedSettings, SettingsResolver};
pub use single_flight::{InFlightGuard, InFlightRegistry};
