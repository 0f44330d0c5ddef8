//! Task due-date projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use studiodesk_core::types::UserId;

use super::status::TaskStatus;

/// The subset of a task row needed to decide due-date alerts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskDue {
    /// Task identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Task title, used in alert titles.
    pub title: String,
    /// Due date, if one has been set.
    pub due_date: Option<NaiveDate>,
    /// Current lifecycle status.
    pub status: TaskStatus,
}

impl TaskDue {
    /// The due date, if the task is still open and has one.
    pub fn open_due_date(&self) -> Option<NaiveDate> {
        if self.status.is_open() {
            self.due_date
        } else {
            None
        }
    }
}
