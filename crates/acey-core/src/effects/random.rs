//! Randomness effects used for identifier generation.

use crate::AceyResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Source of fresh identifiers.
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// Generate a fresh random UUID.
    async fn random_uuid(&self) -> AceyResult<Uuid>;
}

#[async_trait]
impl<T: RandomEffects + ?Sized> RandomEffects for std::sync::Arc<T> {
    async fn random_uuid(&self) -> AceyResult<Uuid> {
        (**self).random_uuid().await
    }
}
