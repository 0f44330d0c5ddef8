//! Emitted alert record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use studiodesk_core::types::{AlertId, UserId};

use super::candidate::AlertCandidate;
use super::kind::{AlertKind, EntityKind};
use super::triple::AlertTriple;

/// A durable alert shown in the user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Recipient.
    pub user_id: UserId,
    /// Alert kind.
    pub kind: AlertKind,
    /// Kind of the referenced entity.
    pub entity_kind: EntityKind,
    /// Identifier of the referenced entity.
    pub entity_id: Uuid,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Whether the user has read it.
    pub is_read: bool,
    /// When it was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When it was emitted.
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Materialize a candidate as a fresh, unread alert.
    pub fn from_candidate(
        user_id: UserId,
        candidate: AlertCandidate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            user_id,
            kind: candidate.alert_kind,
            entity_kind: candidate.entity_kind,
            entity_id: candidate.entity_id,
            title: candidate.title,
            message: candidate.message,
            is_read: false,
            read_at: None,
            created_at,
        }
    }

    /// The dedup key of this alert.
    pub fn triple(&self) -> AlertTriple {
        AlertTriple {
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            alert_kind: self.kind,
        }
    }
}
