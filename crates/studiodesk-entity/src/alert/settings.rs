//! Per-user alert settings.

use serde::{Deserialize, Serialize};

/// Default project lead-times, in days.
pub const DEFAULT_LEAD_DAYS: [u32; 3] = [1, 3, 7];

/// Which alerts a user wants and how early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Days before a project deadline at which an alert fires. Kept sorted,
    /// unique and positive.
    pub lead_days: Vec<u32>,
    /// Whether pending payments older than the aging threshold are reported.
    pub payment_aging: bool,
}

impl AlertSettings {
    /// Build settings, normalizing the lead-times.
    pub fn new(lead_days: impl IntoIterator<Item = u32>, payment_aging: bool) -> Self {
        Self {
            lead_days: normalize_lead_days(lead_days),
            payment_aging,
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_DAYS, true)
    }
}

/// Sort, deduplicate and drop non-positive lead-times.
pub fn normalize_lead_days(lead_days: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut days: Vec<u32> = lead_days.into_iter().filter(|d| *d > 0).collect();
    days.sort_unstable();
    days.dedup();
    days
}
