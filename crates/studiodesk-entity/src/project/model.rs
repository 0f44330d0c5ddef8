//! Project deadline projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use studiodesk_core::types::UserId;

use super::status::ProjectStatus;

/// The subset of a project row needed to decide deadline alerts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectDeadline {
    /// Project identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Display name, used in alert titles.
    pub name: String,
    /// Delivery deadline, if one has been set.
    pub deadline: Option<NaiveDate>,
    /// Current lifecycle status.
    pub status: ProjectStatus,
}

impl ProjectDeadline {
    /// The deadline, if the project is still open and has one.
    pub fn open_deadline(&self) -> Option<NaiveDate> {
        if self.status.is_open() {
            self.deadline
        } else {
            None
        }
    }
}
