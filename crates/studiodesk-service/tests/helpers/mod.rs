//! Shared fixtures for reconciliation integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use studiodesk_core::traits::FixedClock;
use studiodesk_core::types::UserId;
use studiodesk_database::MemoryAlertStore;
use studiodesk_entity::alert::AlertKind;
use studiodesk_entity::payment::{PaymentStatus, PendingPayment};
use studiodesk_entity::project::{ProjectDeadline, ProjectStatus};
use studiodesk_entity::task::{TaskDue, TaskStatus};
use studiodesk_service::AlertReconciler;

/// One owner, an in-memory store and a reconciler on a pinned clock.
pub struct TestApp {
    pub store: MemoryAlertStore,
    pub clock: FixedClock,
    pub reconciler: AlertReconciler,
    pub owner: UserId,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryAlertStore::new();
        let clock = FixedClock::new(Self::start_date());
        let reconciler = AlertReconciler::new(Arc::new(store.clone()), Arc::new(clock.clone()));
        Self {
            store,
            clock,
            reconciler,
            owner: UserId::new(),
        }
    }

    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    pub fn today(&self) -> NaiveDate {
        use studiodesk_core::traits::Clock;
        self.clock.today()
    }

    /// Add an in-progress project due `offset` days from today.
    pub async fn add_project(&self, name: &str, offset: i64) -> Uuid {
        self.add_project_with_status(name, offset, ProjectStatus::InProgress)
            .await
    }

    pub async fn add_project_with_status(&self, name: &str, offset: i64, status: ProjectStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .put_project(ProjectDeadline {
                id,
                user_id: self.owner,
                name: name.to_string(),
                deadline: Some(self.today() + Duration::days(offset)),
                status,
            })
            .await;
        id
    }

    /// Add an open task due `offset` days from today.
    pub async fn add_task(&self, title: &str, offset: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .put_task(TaskDue {
                id,
                user_id: self.owner,
                title: title.to_string(),
                due_date: Some(self.today() + Duration::days(offset)),
                status: TaskStatus::InProgress,
            })
            .await;
        id
    }

    /// Add a pending payment recorded `age_days` ago.
    pub async fn add_payment(&self, age_days: i64) -> Uuid {
        let id = Uuid::new_v4();
        let created = self.today() - Duration::days(age_days);
        self.store
            .put_payment(PendingPayment {
                id,
                user_id: self.owner,
                amount: Decimal::new(48_000, 2),
                currency: "USD".to_string(),
                description: Some("Logo package".to_string()),
                status: PaymentStatus::Pending,
                created_at: Local
                    .from_local_datetime(&created.and_hms_opt(15, 0, 0).unwrap())
                    .earliest()
                    .unwrap()
                    .with_timezone(&Utc),
            })
            .await;
        id
    }

    /// Stored alerts as `(entity id, kind)`, oldest first.
    pub async fn alerts(&self) -> Vec<(Uuid, AlertKind)> {
        self.store
            .alerts_for(self.owner)
            .await
            .into_iter()
            .map(|a| (a.entity_id, a.kind))
            .collect()
    }
}
