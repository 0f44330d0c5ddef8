//! Alert inbox: listing, read tracking and deletion of emitted alerts.

use std::sync::Arc;

use tracing::info;

use studiodesk_core::error::AppError;
use studiodesk_core::result::AppResult;
use studiodesk_core::types::pagination::{PageRequest, PageResponse};
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_database::AlertInbox;
use studiodesk_entity::alert::Alert;

/// Manages a user's emitted alerts.
#[derive(Clone)]
pub struct AlertInboxService {
    inbox: Arc<dyn AlertInbox>,
}

impl std::fmt::Debug for AlertInboxService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertInboxService").finish()
    }
}

impl AlertInboxService {
    /// Creates a new inbox service.
    pub fn new(inbox: Arc<dyn AlertInbox>) -> Self {
        Self { inbox }
    }

    /// Lists alerts for `owner`, newest first.
    pub async fn list(&self, owner: UserId, page: PageRequest) -> AppResult<PageResponse<Alert>> {
        self.inbox.list_alerts(owner, &page).await
    }

    /// Gets the unread alert count.
    pub async fn unread_count(&self, owner: UserId) -> AppResult<u64> {
        self.inbox.count_unread(owner).await
    }

    /// Marks an alert as read.
    pub async fn mark_read(&self, owner: UserId, alert_id: AlertId) -> AppResult<()> {
        if self.inbox.mark_read(owner, alert_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Alert {alert_id} not found")))
        }
    }

    /// Marks all alerts as read for `owner`.
    pub async fn mark_all_read(&self, owner: UserId) -> AppResult<u64> {
        let changed = self.inbox.mark_all_read(owner).await?;
        info!(owner = %owner, changed, "Alerts marked read");
        Ok(changed)
    }

    /// Deletes an alert. The triple stays in the emission ledger, so the
    /// same alert is not produced again.
    pub async fn delete(&self, owner: UserId, alert_id: AlertId) -> AppResult<()> {
        if self.inbox.delete_alert(owner, alert_id).await? {
            info!(owner = %owner, alert_id = %alert_id, "Alert deleted");
            Ok(())
        } else {
            Err(AppError::not_found(format!("Alert {alert_id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use studiodesk_core::error::ErrorKind;
    use studiodesk_database::{AlertStore, MemoryAlertStore};
    use studiodesk_entity::alert::{AlertCandidate, AlertKind};

    use super::*;

    async fn seeded() -> (MemoryAlertStore, AlertInboxService, UserId) {
        let store = MemoryAlertStore::new();
        let owner = UserId::new();
        store
            .insert_alerts(
                owner,
                &[
                    AlertCandidate::new(Uuid::new_v4(), AlertKind::TaskOverdue, "a", "m"),
                    AlertCandidate::new(Uuid::new_v4(), AlertKind::PaymentAging, "b", "m"),
                ],
            )
            .await
            .unwrap();
        let service = AlertInboxService::new(Arc::new(store.clone()));
        (store, service, owner)
    }

    #[tokio::test]
    async fn test_mark_read_and_unread_count() {
        let (_store, service, owner) = seeded().await;
        assert_eq!(service.unread_count(owner).await.unwrap(), 2);

        let page = service.list(owner, PageRequest::default()).await.unwrap();
        service.mark_read(owner, page.items[0].id).await.unwrap();
        assert_eq!(service.unread_count(owner).await.unwrap(), 1);

        assert_eq!(service.mark_all_read(owner).await.unwrap(), 1);
        assert_eq!(service.unread_count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_other_owners_alert_is_not_found() {
        let (_store, service, owner) = seeded().await;
        let page = service.list(owner, PageRequest::default()).await.unwrap();
        let stranger = UserId::new();

        let err = service.mark_read(stranger, page.items[0].id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = service.delete(stranger, page.items[0].id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_keeps_ledger() {
        let (store, service, owner) = seeded().await;
        let page = service.list(owner, PageRequest::default()).await.unwrap();

        service.delete(owner, page.items[0].id).await.unwrap();
        assert_eq!(service.list(owner, PageRequest::default()).await.unwrap().total_items, 1);
        assert_eq!(store.list_emitted_triples(owner).await.unwrap().len(), 2);
    }
}
