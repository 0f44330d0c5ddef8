//! # studiodesk-service
//!
//! Service layer for Studiodesk alerts. The [`alerts`] module holds the
//! reconciliation engine that turns project deadlines, task due dates and
//! aging payments into at-most-once alert records; [`inbox`] exposes the
//! emitted records to the user.
//!
//! Services take their dependencies at construction time as `Arc`s.

pub mod alerts;
pub mod inbox;

pub use alerts::{
    AlertReconciler, AlertSettingsUpdate, ReconcileOutcome, ReconcilePhase, ReconcileReport,
    ResolvedSettings, SettingsResolver,
};
pub use inbox::AlertInboxService;
