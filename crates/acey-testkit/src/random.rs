//! Predictable identifier source.

use acey_core::effects::RandomEffects;
use acey_core::AceyResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Hands out `Uuid::from_u128(1)`, `Uuid::from_u128(2)`, ...
#[derive(Debug)]
pub struct DeterministicRandom {
    next: AtomicU64,
}

impl DeterministicRandom {
    /// Start counting at `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }
}

impl Default for DeterministicRandom {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl RandomEffects for DeterministicRandom {
    async fn random_uuid(&self) -> AceyResult<Uuid> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(Uuid::from_u128(u128::from(n)))
    }
}
