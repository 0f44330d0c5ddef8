//! # studiodesk-entity
//!
//! Domain models for Studiodesk alerting. The tracked entities (projects,
//! tasks, payments) are read-only projections of the rows the alert engine
//! inspects; the `alert` module holds the closed set of alert kinds, the
//! dedup triple, candidates, emitted alerts, and per-user settings.

pub mod alert;
pub mod payment;
pub mod project;
pub mod task;
