//! Removes candidates whose triple was already emitted.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use studiodesk_core::result::AppResult;
use studiodesk_core::types::UserId;
use studiodesk_database::AlertStore;
use studiodesk_entity::alert::{AlertCandidate, AlertTriple};

/// Keep candidates whose triple is not in `emitted`, and only the first of
/// several candidates sharing a triple. Order is preserved.
pub fn filter_unemitted(
    candidates: Vec<AlertCandidate>,
    emitted: &HashSet<AlertTriple>,
) -> Vec<AlertCandidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| {
            let triple = c.triple();
            !emitted.contains(&triple) && seen.insert(triple)
        })
        .collect()
}

/// Loads the owner's emission ledger and filters against it.
#[derive(Clone)]
pub struct DedupFilter {
    store: Arc<dyn AlertStore>,
}

impl std::fmt::Debug for DedupFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupFilter").finish()
    }
}

impl DedupFilter {
    /// Creates a new dedup filter over `store`.
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Candidates not yet emitted for `owner`. The ledger is read once, and
    /// not at all when there is nothing to filter.
    pub async fn filter(
        &self,
        owner: UserId,
        candidates: Vec<AlertCandidate>,
    ) -> AppResult<Vec<AlertCandidate>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let emitted = self.store.list_emitted_triples(owner).await?;
        let total = candidates.len();
        let fresh = filter_unemitted(candidates, &emitted);

        debug!(
            owner = %owner,
            candidates = total,
            fresh = fresh.len(),
            ledger = emitted.len(),
            "Dedup filter applied"
        );
        Ok(fresh)
    }
}
