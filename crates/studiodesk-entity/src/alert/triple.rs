//! The composite key that enforces at-most-once emission.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{AlertKind, EntityKind};

/// `(entity kind, entity id, alert kind)`, compared structurally.
///
/// For a given owner each triple is emitted at most once, ever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertTriple {
    /// Kind of the entity the alert is about.
    pub entity_kind: EntityKind,
    /// Identifier of that entity.
    pub entity_id: Uuid,
    /// The alert kind.
    pub alert_kind: AlertKind,
}

impl AlertTriple {
    /// Build a triple, deriving the entity kind from the alert kind.
    pub fn new(entity_id: Uuid, alert_kind: AlertKind) -> Self {
        Self {
            entity_kind: alert_kind.entity_kind(),
            entity_id,
            alert_kind,
        }
    }
}
