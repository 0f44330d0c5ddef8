//! Alert reconciliation scheduling configuration.

use serde::{Deserialize, Serialize};

/// Controls when alert reconciliation runs for signed-in users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Whether periodic reconciliation is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for the periodic tick.
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Whether a session start triggers an immediate reconciliation.
    #[serde(default = "default_true")]
    pub run_on_session_start: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            run_on_session_start: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 */5 * * * *".to_string()
}
