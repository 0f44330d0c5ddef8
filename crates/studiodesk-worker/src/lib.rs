//! Scheduling for alert reconciliation.
//!
//! This crate provides:
//! - A session registry that tracks signed-in owners and runs one
//!   reconciliation per owner on each trigger
//! - A cron scheduler that fires the periodic trigger

pub mod scheduler;
pub mod sessions;

pub use scheduler::AlertScheduler;
pub use sessions::SessionRegistry;
