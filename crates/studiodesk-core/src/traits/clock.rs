//! Source of the calendar date that alert windows are computed against.

use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDate};

/// Supplies "today" as a calendar date.
///
/// All deadline comparisons are date-only, so the clock exposes a
/// [`NaiveDate`] rather than an instant.
pub trait Clock: Send + Sync + 'static {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a settable date. Used by tests and replay tooling.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<RwLock<NaiveDate>>,
}

impl FixedClock {
    /// Create a clock that always reports `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(RwLock::new(date)),
        }
    }

    /// Move the clock to `date`. Clones share the same date.
    pub fn set(&self, date: NaiveDate) {
        let mut guard = self.date.write().unwrap_or_else(|e| e.into_inner());
        *guard = date;
    }

    /// Advance the clock by `days`.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.date.write().unwrap_or_else(|e| e.into_inner());
        *guard += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.read().unwrap_or_else(|e| e.into_inner())
    }
}
