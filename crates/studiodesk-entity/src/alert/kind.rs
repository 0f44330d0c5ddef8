//! Alert kind and entity kind enumerations.
//!
//! Both are persisted as plain text. Kinds that carry a lead-time encode it
//! as a numeric suffix (`deadline_warning_7`, `task_due_soon_3`) so that
//! each lead-time forms its own dedup triple.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lead-times (days) for task due-soon alerts. Not user-configurable.
pub const TASK_LEAD_DAYS: [u32; 2] = [1, 3];

/// Days a payment may stay pending before it is reported as aging.
pub const PAYMENT_AGING_DAYS: i64 = 30;

/// Error returned when a persisted kind string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what}: '{value}'")]
pub struct ParseKindError {
    what: &'static str,
    value: String,
}

impl ParseKindError {
    fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

/// The kind of tracked entity an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A client project with a delivery deadline.
    Project,
    /// A task with a due date.
    Task,
    /// An invoiced payment awaiting settlement.
    Payment,
}

impl EntityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Self::Project),
            "task" => Ok(Self::Task),
            "payment" => Ok(Self::Payment),
            other => Err(ParseKindError::new("entity kind", other)),
        }
    }
}

/// The closed set of alerts the reconciliation engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlertKind {
    /// Project deadline has passed.
    DeadlineOverdue,
    /// Project is due tomorrow (or today).
    DeadlineUrgent,
    /// Project is due in exactly `lead_days` days, `lead_days > 1`.
    DeadlineWarning {
        /// Configured lead-time that matched.
        lead_days: u32,
    },
    /// Task due date has passed.
    TaskOverdue,
    /// Task is due in exactly `lead_days` days (1 or 3).
    TaskDueSoon {
        /// Fixed lead-time that matched.
        lead_days: u32,
    },
    /// Payment has been pending for more than [`PAYMENT_AGING_DAYS`].
    PaymentAging,
}

impl AlertKind {
    /// The entity kind this alert kind is always attached to.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::DeadlineOverdue | Self::DeadlineUrgent | Self::DeadlineWarning { .. } => {
                EntityKind::Project
            }
            Self::TaskOverdue | Self::TaskDueSoon { .. } => EntityKind::Task,
            Self::PaymentAging => EntityKind::Payment,
        }
    }

    /// Project lead-time alert for `lead_days`: urgent at one day, a
    /// warning otherwise.
    pub fn project_lead(lead_days: u32) -> Self {
        if lead_days <= 1 {
            Self::DeadlineUrgent
        } else {
            Self::DeadlineWarning { lead_days }
        }
    }

    /// Whether this kind reports a missed date.
    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::DeadlineOverdue | Self::TaskOverdue)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineOverdue => f.write_str("deadline_overdue"),
            Self::DeadlineUrgent => f.write_str("deadline_urgent"),
            Self::DeadlineWarning { lead_days } => write!(f, "deadline_warning_{lead_days}"),
            Self::TaskOverdue => f.write_str("task_overdue"),
            Self::TaskDueSoon { lead_days } => write!(f, "task_due_soon_{lead_days}"),
            Self::PaymentAging => f.write_str("payment_aging"),
        }
    }
}

impl FromStr for AlertKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_lead = |suffix: &str| -> Result<u32, ParseKindError> {
            suffix
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ParseKindError::new("alert kind", s))
        };

        match s {
            "deadline_overdue" => Ok(Self::DeadlineOverdue),
            "deadline_urgent" => Ok(Self::DeadlineUrgent),
            "task_overdue" => Ok(Self::TaskOverdue),
            "payment_aging" => Ok(Self::PaymentAging),
            _ => {
                if let Some(suffix) = s.strip_prefix("deadline_warning_") {
                    let lead_days = parse_lead(suffix)?;
                    if lead_days == 1 {
                        return Err(ParseKindError::new("alert kind", s));
                    }
                    Ok(Self::DeadlineWarning { lead_days })
                } else if let Some(suffix) = s.strip_prefix("task_due_soon_") {
                    let lead_days = parse_lead(suffix)?;
                    if !TASK_LEAD_DAYS.contains(&lead_days) {
                        return Err(ParseKindError::new("alert kind", s));
                    }
                    Ok(Self::TaskDueSoon { lead_days })
                } else {
                    Err(ParseKindError::new("alert kind", s))
                }
            }
        }
    }
}

impl TryFrom<String> for AlertKind {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlertKind> for String {
    fn from(kind: AlertKind) -> Self {
        kind.to_string()
    }
}
