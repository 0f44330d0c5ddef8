//! Writes surviving candidates as alert records.

use std::sync::Arc;

use tracing::info;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_database::AlertStore;
use studiodesk_entity::alert::AlertCandidate;

/// Batch writer for new alerts.
#[derive(Clone)]
pub struct Emitter {
    store: Arc<dyn AlertStore>,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").finish()
    }
}

impl Emitter {
    /// Creates a new emitter over `store`.
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Persist `candidates` in one write. Returns how many alerts were
    /// created; an empty slice makes no store call.
    ///
    /// On error some alerts may already be stored. Their triples are in the
    /// ledger, so the next run only retries the rest.
    pub async fn emit(&self, owner: UserId, candidates: &[AlertCandidate]) -> AppResult<usize> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let written = self.store.insert_alerts(owner, candidates).await?;
        info!(
            owner = %owner,
            requested = candidates.len(),
            written,
            "Alerts emitted"
        );
        Ok(written)
    }
}
