//! Alert candidates produced by the scanners.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{AlertKind, EntityKind};
use super::triple::AlertTriple;

/// An alert a scanner believes is currently due, before dedup filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCandidate {
    /// Kind of the entity the alert is about.
    pub entity_kind: EntityKind,
    /// Identifier of that entity.
    pub entity_id: Uuid,
    /// The alert kind.
    pub alert_kind: AlertKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl AlertCandidate {
    /// Create a candidate for `entity_id`.
    pub fn new(
        entity_id: Uuid,
        alert_kind: AlertKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind: alert_kind.entity_kind(),
            entity_id,
            alert_kind,
            title: title.into(),
            message: message.into(),
        }
    }

    /// The dedup key of this candidate.
    pub fn triple(&self) -> AlertTriple {
        AlertTriple {
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            alert_kind: self.alert_kind,
        }
    }
}
