//! OS-backed randomness handler.

use acey_core::effects::RandomEffects;
use acey_core::AceyResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Random handler backed by the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandomHandler;

impl SystemRandomHandler {
    /// Create a new system random handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for SystemRandomHandler {
    #[allow(clippy::disallowed_methods)]
    async fn random_uuid(&self) -> AceyResult<Uuid> {
        Ok(Uuid::new_v4())
    }
}
