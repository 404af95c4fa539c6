//! In-memory ceremony pool.
//!
//! Holds at most one pending request plus any terminal requests that have
//! not been acknowledged yet.

use crate::errors::{UnlockError, UnlockResult};
use crate::types::UnlockRequest;
use acey_core::CeremonyId;
use std::collections::HashMap;

/// Requests known to the ceremony driver.
#[derive(Debug, Default)]
pub struct CeremonyRegistry {
    requests: HashMap<CeremonyId, UnlockRequest>,
}

impl CeremonyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new request, enforcing the single-pending invariant.
    pub fn admit(&mut self, request: UnlockRequest) -> UnlockResult<()> {
        if let Some(active) = self.active() {
            return Err(UnlockError::CeremonyAlreadyActive { active: active.id() });
        }
        self.requests.insert(request.id(), request);
        Ok(())
    }

    /// The pending request, if any.
    pub fn active(&self) -> Option<&UnlockRequest> {
        self.requests.values().find(|r| r.is_pending())
    }

    /// Id of the pending request, if any.
    pub fn active_id(&self) -> Option<CeremonyId> {
        self.active().map(UnlockRequest::id)
    }

    /// Look up a request.
    pub fn get(&self, id: &CeremonyId) -> Option<&UnlockRequest> {
        self.requests.get(id)
    }

    /// Look up a request or fail with `NotFound`.
    pub fn require(&self, id: &CeremonyId) -> UnlockResult<&UnlockRequest> {
        self.get(id).ok_or(UnlockError::NotFound { id: *id })
    }

    pub(crate) fn require_mut(&mut self, id: &CeremonyId) -> UnlockResult<&mut UnlockRequest> {
        self.requests
            .get_mut(id)
            .ok_or(UnlockError::NotFound { id: *id })
    }

    /// Forget a terminal request.
    pub fn acknowledge(&mut self, id: &CeremonyId) -> UnlockResult<UnlockRequest> {
        let request = self.require(id)?;
        if !request.is_terminal() {
            return Err(UnlockError::NotTerminal { id: *id });
        }
        self.requests
            .remove(id)
            .ok_or(UnlockError::NotFound { id: *id })
    }

    /// Ids of all pending requests. Never more than one.
    pub fn pending_ids(&self) -> Vec<CeremonyId> {
        self.requests
            .values()
            .filter(|r| r.is_pending())
            .map(UnlockRequest::id)
            .collect()
    }

    /// Number of retained requests, terminal ones included.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the registry holds no requests.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageTimings;
    use crate::event::CeremonyEvent;
    use crate::state_machine::apply;
    use uuid::Uuid;

    fn request(n: u128) -> UnlockRequest {
        UnlockRequest::new(CeremonyId::from_uuid(Uuid::from_u128(n)), "reason", 0, 1_000).unwrap()
    }

    #[test]
    fn test_second_pending_request_rejected() {
        let mut registry = CeremonyRegistry::new();
        let first = request(1);
        let first_id = first.id();
        registry.admit(first).unwrap();

        let err = registry.admit(request(2)).unwrap_err();
        assert_eq!(err, UnlockError::CeremonyAlreadyActive { active: first_id });
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pending_ids(), vec![first_id]);
    }

    #[test]
    fn test_terminal_request_frees_the_slot() {
        let mut registry = CeremonyRegistry::new();
        let first = request(1);
        let first_id = first.id();
        registry.admit(first).unwrap();
        apply(
            registry.require_mut(&first_id).unwrap(),
            CeremonyEvent::CancelRequested,
            5,
            &StageTimings::default(),
        );

        registry.admit(request(2)).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_id(), Some(CeremonyId::from_uuid(Uuid::from_u128(2))));
    }

    #[test]
    fn test_acknowledge_requires_terminal() {
        let mut registry = CeremonyRegistry::new();
        let r = request(1);
        let id = r.id();
        registry.admit(r).unwrap();

        assert_eq!(
            registry.acknowledge(&id).unwrap_err(),
            UnlockError::NotTerminal { id }
        );
        apply(
            registry.require_mut(&id).unwrap(),
            CeremonyEvent::CancelRequested,
            5,
            &StageTimings::default(),
        );
        assert_eq!(registry.acknowledge(&id).unwrap().id(), id);
        assert!(registry.is_empty());
        assert_eq!(
            registry.acknowledge(&id).unwrap_err(),
            UnlockError::NotFound { id }
        );
    }
}
