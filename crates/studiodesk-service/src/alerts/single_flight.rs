//! Owner-scoped single-flight guard.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use studiodesk_core::types::UserId;

/// Tracks which owners have a reconciliation in flight.
///
/// Acquiring for an owner that is already running fails immediately; the
/// caller drops its trigger rather than waiting.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    running: Arc<DashMap<UserId, DateTime<Utc>>>,
}

impl InFlightRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `owner`, or `None` if a run already holds it.
    pub fn try_acquire(&self, owner: UserId) -> Option<InFlightGuard> {
        match self.running.entry(owner) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Some(InFlightGuard {
                    running: Arc::clone(&self.running),
                    owner,
                })
            }
        }
    }

    /// When the current run for `owner` started, if one is in flight.
    pub fn started_at(&self, owner: UserId) -> Option<DateTime<Utc>> {
        self.running.get(&owner).map(|entry| *entry.value())
    }

    /// Whether a run for `owner` is in flight.
    pub fn is_in_flight(&self, owner: UserId) -> bool {
        self.running.contains_key(&owner)
    }

    /// Number of owners currently running.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Whether no run is in flight.
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

/// Releases the owner's slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    running: Arc<DashMap<UserId, DateTime<Utc>>>,
    owner: UserId,
}

impl InFlightGuard {
    /// The owner this guard holds.
    pub fn owner(&self) -> UserId {
        self.owner
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.running.remove(&self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected_until_release() {
        let registry = InFlightRegistry::new();
        let owner = UserId::new();

        let guard = registry.try_acquire(owner).unwrap();
        assert!(registry.is_in_flight(owner));
        assert!(registry.started_at(owner).is_some());
        assert!(registry.try_acquire(owner).is_none());

        drop(guard);
        assert!(!registry.is_in_flight(owner));
        assert!(registry.try_acquire(owner).is_some());
    }

    #[test]
    fn test_owners_do_not_block_each_other() {
        let registry = InFlightRegistry::new();
        let a = registry.try_acquire(UserId::new()).unwrap();
        let b = registry.try_acquire(UserId::new()).unwrap();
        assert_ne!(a.owner(), b.owner());
        assert_eq!(registry.len(), 2);

        drop((a, b));
        assert!(registry.is_empty());
    }
}
