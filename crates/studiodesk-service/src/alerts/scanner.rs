//! Candidate scanners.
//!
//! Each scanner is a pure function of `today`, the owner's settings and the
//! entities read for it. Windows are exact single days: a deadline seven
//! days out matches the 7-day lead-time only on that day.

use std::fmt;

use chrono::{Local, NaiveDate};

use studiodesk_core::error::AppError;
use studiodesk_entity::alert::kind::{PAYMENT_AGING_DAYS, TASK_LEAD_DAYS};
use studiodesk_entity::alert::{AlertCandidate, AlertKind, AlertSettings};
use studiodesk_entity::payment::{PaymentStatus, PendingPayment};
use studiodesk_entity::project::ProjectDeadline;
use studiodesk_entity::task::TaskDue;

/// Identifies one of the three scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerKind {
    /// Project deadlines.
    ProjectDeadline,
    /// Task due dates.
    TaskDue,
    /// Pending payment aging.
    PaymentAging,
}

impl ScannerKind {
    /// Return the scanner name as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectDeadline => "project_deadline",
            Self::TaskDue => "task_due",
            Self::PaymentAging => "payment_aging",
        }
    }
}

impl fmt::Display for ScannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanner that could not run because its source read failed.
#[derive(Debug, Clone)]
pub struct ScanFailure {
    /// Which scanner.
    pub scanner: ScannerKind,
    /// The read error.
    pub error: AppError,
}

fn days(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

/// Where a date falls relative to today, restricted to the windows that
/// produce alerts.
enum Window {
    Overdue(i64),
    Today,
    Lead(u32),
}

fn window(today: NaiveDate, date: NaiveDate, lead_days: &[u32]) -> Option<Window> {
    let remaining = (date - today).num_days();
    if remaining < 0 {
        return Some(Window::Overdue(-remaining));
    }
    if remaining == 0 {
        return Some(Window::Today);
    }
    lead_days
        .iter()
        .copied()
        .find(|n| i64::from(*n) == remaining)
        .map(Window::Lead)
}

/// Deadline alerts for open projects.
///
/// A deadline already passed yields only `deadline_overdue`. A deadline of
/// today folds into `deadline_urgent`.
pub fn scan_projects(
    today: NaiveDate,
    settings: &AlertSettings,
    projects: &[ProjectDeadline],
) -> Vec<AlertCandidate> {
    let mut candidates = Vec::new();

    for project in projects {
        let Some(deadline) = project.open_deadline() else {
            continue;
        };
        let name = &project.name;

        let candidate = match window(today, deadline, &settings.lead_days) {
            Some(Window::Overdue(late)) => AlertCandidate::new(
                project.id,
                AlertKind::DeadlineOverdue,
                format!("Project overdue: {name}"),
                format!(
                    "\"{name}\" was due on {deadline} and is {} overdue.",
                    days(late)
                ),
            ),
            Some(Window::Today) => AlertCandidate::new(
                project.id,
                AlertKind::DeadlineUrgent,
                format!("Project due today: {name}"),
                format!("\"{name}\" is due today ({deadline})."),
            ),
            Some(Window::Lead(1)) => AlertCandidate::new(
                project.id,
                AlertKind::DeadlineUrgent,
                format!("Project due tomorrow: {name}"),
                format!("\"{name}\" is due tomorrow ({deadline})."),
            ),
            Some(Window::Lead(n)) => AlertCandidate::new(
                project.id,
                AlertKind::project_lead(n),
                format!("Project due in {}: {name}", days(i64::from(n))),
                format!("\"{name}\" is due on {deadline}, {} from now.", days(i64::from(n))),
            ),
            None => continue,
        };
        candidates.push(candidate);
    }

    candidates
}

/// Due-date alerts for open tasks, on the fixed 1- and 3-day lead-times.
pub fn scan_tasks(today: NaiveDate, tasks: &[TaskDue]) -> Vec<AlertCandidate> {
    let mut candidates = Vec::new();

    for task in tasks {
        let Some(due) = task.open_due_date() else {
            continue;
        };
        let title = &task.title;

        let candidate = match window(today, due, &TASK_LEAD_DAYS) {
            Some(Window::Overdue(late)) => AlertCandidate::new(
                task.id,
                AlertKind::TaskOverdue,
                format!("Task overdue: {title}"),
                format!("\"{title}\" was due on {due} and is {} overdue.", days(late)),
            ),
            Some(Window::Today) => AlertCandidate::new(
                task.id,
                AlertKind::TaskDueSoon { lead_days: 1 },
                format!("Task due today: {title}"),
                format!("\"{title}\" is due today ({due})."),
            ),
            Some(Window::Lead(n)) => AlertCandidate::new(
                task.id,
                AlertKind::TaskDueSoon { lead_days: n },
                format!("Task due in {}: {title}", days(i64::from(n))),
                format!("\"{title}\" is due on {due}."),
            ),
            None => continue,
        };
        candidates.push(candidate);
    }

    candidates
}

/// Aging alerts for payments pending more than [`PAYMENT_AGING_DAYS`].
/// Yields nothing when the owner turned payment reminders off.
///
/// A payment's age counts calendar days in the host's local time zone, the
/// same zone [`SystemClock`](studiodesk_core::traits::SystemClock) takes
/// `today` from.
pub fn scan_payments(
    today: NaiveDate,
    settings: &AlertSettings,
    payments: &[PendingPayment],
) -> Vec<AlertCandidate> {
    if !settings.payment_aging {
        return Vec::new();
    }

    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending)
        .filter_map(|payment| {
            let created = payment.created_at.with_timezone(&Local).date_naive();
            let age = (today - created).num_days();
            if age <= PAYMENT_AGING_DAYS {
                return None;
            }

            let amount = payment.display_amount();
            let subject = match &payment.description {
                Some(description) => format!("{amount} ({description})"),
                None => amount.clone(),
            };
            Some(AlertCandidate::new(
                payment.id,
                AlertKind::PaymentAging,
                format!("Payment pending for {}: {amount}", days(age)),
                format!("{subject} has been pending since {created}."),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use studiodesk_core::types::UserId;
    use studiodesk_entity::project::ProjectStatus;
    use studiodesk_entity::task::TaskStatus;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn project(offset: i64, status: ProjectStatus) -> ProjectDeadline {
        ProjectDeadline {
            id: Uuid::new_v4(),
            user_id: UserId::new(),
            name: "Brand refresh".to_string(),
            deadline: Some(today() + Duration::days(offset)),
            status,
        }
    }

    fn task(offset: i64) -> TaskDue {
        TaskDue {
            id: Uuid::new_v4(),
            user_id: UserId::new(),
            title: "Send proofs".to_string(),
            due_date: Some(today() + Duration::days(offset)),
            status: TaskStatus::Todo,
        }
    }

    fn local(at: NaiveDateTime) -> DateTime<Utc> {
        Local.from_local_datetime(&at).earliest().unwrap().with_timezone(&Utc)
    }

    fn payment_at(created_at: DateTime<Utc>) -> PendingPayment {
        PendingPayment {
            id: Uuid::new_v4(),
            user_id: UserId::new(),
            amount: Decimal::new(125_000, 2),
            currency: "EUR".to_string(),
            description: Some("Invoice 42".to_string()),
            status: PaymentStatus::Pending,
            created_at,
        }
    }

    fn payment(age_days: i64) -> PendingPayment {
        let created = today() - Duration::days(age_days);
        payment_at(local(created.and_hms_opt(9, 30, 0).unwrap()))
    }

    fn kinds(candidates: &[AlertCandidate]) -> Vec<AlertKind> {
        candidates.iter().map(|c| c.alert_kind).collect()
    }

    #[test]
    fn test_project_exact_lead_match() {
        let settings = AlertSettings::default();
        let found = scan_projects(today(), &settings, &[project(3, ProjectStatus::InProgress)]);
        assert_eq!(kinds(&found), vec![AlertKind::DeadlineWarning { lead_days: 3 }]);
        assert_eq!(found[0].title, "Project due in 3 days: Brand refresh");

        // Between lead-times nothing fires.
        assert!(scan_projects(today(), &settings, &[project(5, ProjectStatus::Planning)]).is_empty());
    }

    #[test]
    fn test_project_overdue_takes_precedence() {
        let settings = AlertSettings::new([1, 3, 7], true);
        let found = scan_projects(today(), &settings, &[project(-1, ProjectStatus::OnHold)]);
        assert_eq!(kinds(&found), vec![AlertKind::DeadlineOverdue]);
        assert!(found[0].message.contains("1 day overdue"));

        let found = scan_projects(today(), &settings, &[project(-4, ProjectStatus::OnHold)]);
        assert!(found[0].message.contains("4 days overdue"));
    }

    #[test]
    fn test_project_due_today_and_tomorrow_are_urgent() {
        let settings = AlertSettings::new([7], true);
        let found = scan_projects(
            today(),
            &settings,
            &[project(0, ProjectStatus::InProgress), project(1, ProjectStatus::InProgress)],
        );
        // Tomorrow only fires when 1 is a configured lead-time; today always does.
        assert_eq!(kinds(&found), vec![AlertKind::DeadlineUrgent]);
        assert_eq!(found[0].title, "Project due today: Brand refresh");

        let found = scan_projects(
            today(),
            &AlertSettings::default(),
            &[project(1, ProjectStatus::InProgress)],
        );
        assert_eq!(kinds(&found), vec![AlertKind::DeadlineUrgent]);
    }

    #[test]
    fn test_project_closed_or_undated_skipped() {
        let settings = AlertSettings::default();
        let mut undated = project(3, ProjectStatus::InProgress);
        undated.deadline = None;

        let found = scan_projects(
            today(),
            &settings,
            &[
                project(-2, ProjectStatus::Completed),
                project(3, ProjectStatus::Cancelled),
                undated,
            ],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_tasks_fixed_windows() {
        let found = scan_tasks(today(), &[task(-2), task(0), task(1), task(3), task(7)]);
        assert_eq!(
            kinds(&found),
            vec![
                AlertKind::TaskOverdue,
                AlertKind::TaskDueSoon { lead_days: 1 },
                AlertKind::TaskDueSoon { lead_days: 1 },
                AlertKind::TaskDueSoon { lead_days: 3 },
            ]
        );
    }

    #[test]
    fn test_task_completed_skipped() {
        let mut done = task(-1);
        done.status = TaskStatus::Completed;
        assert!(scan_tasks(today(), &[done]).is_empty());
    }

    #[test]
    fn test_payment_aging_threshold() {
        let settings = AlertSettings::default();
        let found = scan_payments(today(), &settings, &[payment(31), payment(30), payment(29)]);
        assert_eq!(kinds(&found), vec![AlertKind::PaymentAging]);
        assert!(found[0].title.contains("1250.00 EUR"));
        assert!(found[0].message.contains("Invoice 42"));
    }

    #[test]
    fn test_payment_age_uses_local_calendar_date() {
        let settings = AlertSettings::default();

        // Late evening locally is often the next day in UTC.
        let evening = today() - Duration::days(31);
        let found = scan_payments(
            today(),
            &settings,
            &[payment_at(local(evening.and_hms_opt(21, 0, 0).unwrap()))],
        );
        assert_eq!(kinds(&found), vec![AlertKind::PaymentAging]);
        assert!(found[0].message.contains(&evening.to_string()));

        // Just after midnight locally is often the previous day in UTC.
        let morning = today() - Duration::days(30);
        let found = scan_payments(
            today(),
            &settings,
            &[payment_at(local(morning.and_hms_opt(0, 30, 0).unwrap()))],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_payment_aging_disabled_or_settled() {
        let off = AlertSettings::new([1, 3, 7], false);
        assert!(scan_payments(today(), &off, &[payment(90)]).is_empty());

        let mut paid = payment(90);
        paid.status = PaymentStatus::Paid;
        assert!(scan_payments(today(), &AlertSettings::default(), &[paid]).is_empty());
    }
}
