//! Per-user alert settings: lazy defaults on read, validated explicit save.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use studiodesk_core::error::AppError;
use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_database::AlertStore;
use studiodesk_entity::alert::AlertSettings;

/// Largest lead-time a user may configure.
pub const MAX_LEAD_DAYS: u32 = 365;

/// Settings as seen by one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Effective settings.
    pub settings: AlertSettings,
    /// `false` when these are defaults the user never saved.
    pub persisted: bool,
}

/// A user-submitted settings change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AlertSettingsUpdate {
    /// Project lead-times in days. Order and duplicates do not matter.
    #[validate(length(max = 10), custom(function = "validate_lead_days"))]
    pub lead_days: Vec<u32>,
    /// Whether aging payments are reported.
    pub payment_aging: bool,
}

fn validate_lead_days(lead_days: &[u32]) -> Result<(), ValidationError> {
    if lead_days.iter().all(|d| (1..=MAX_LEAD_DAYS).contains(d)) {
        Ok(())
    } else {
        Err(ValidationError::new("lead_days_out_of_range"))
    }
}

/// Loads settings for a run and saves them on explicit user action.
#[derive(Clone)]
pub struct SettingsResolver {
    store: Arc<dyn AlertStore>,
}

impl std::fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsResolver").finish()
    }
}

impl SettingsResolver {
    /// Creates a new resolver over `store`.
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Stored settings for `owner`, or the defaults if none were saved.
    ///
    /// Defaults are never written back. Fails only when the store does.
    pub async fn resolve(&self, owner: UserId) -> AppResult<ResolvedSettings> {
        match self.store.get_settings(owner).await? {
            Some(settings) => Ok(ResolvedSettings {
                settings,
                persisted: true,
            }),
            None => {
                debug!(owner = %owner, "No stored alert settings, using defaults");
                Ok(ResolvedSettings {
                    settings: AlertSettings::default(),
                    persisted: false,
                })
            }
        }
    }

    /// Validate, normalize and upsert `update`.
    pub async fn save(&self, owner: UserId, update: AlertSettingsUpdate) -> AppResult<AlertSettings> {
        update
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid alert settings: {e}")))?;

        let settings = AlertSettings::new(update.lead_days, update.payment_aging);
        self.store.upsert_settings(owner, &settings).await?;

        info!(
            owner = %owner,
            lead_days = ?settings.lead_days,
            payment_aging = settings.payment_aging,
            "Alert settings saved"
        );
        Ok(settings)
    }
}
