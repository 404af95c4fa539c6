//! Out-of-band desktop confirmation effects.
//!
//! A second, independent channel (the "desktop" peer) must approve the
//! ceremony after the time delay. The call may stay pending indefinitely;
//! the ceremony's own deadline decides when waiting stops mattering.

use crate::{AceyResult, CeremonyId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Answer delivered by the desktop peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopConfirmation {
    /// Whether the peer approved the unlock
    pub confirmed: bool,
}

/// Desktop confirmation channel.
#[async_trait]
pub trait DesktopConfirmationEffects: Send + Sync {
    /// Wait for the desktop peer to approve or deny `ceremony_id`.
    async fn await_confirmation(&self, ceremony_id: CeremonyId)
        -> AceyResult<DesktopConfirmation>;
}

#[async_trait]
impl<T: DesktopConfirmationEffects + ?Sized> DesktopConfirmationEffects for std::sync::Arc<T> {
    async fn await_confirmation(
        &self,
        ceremony_id: CeremonyId,
    ) -> AceyResult<DesktopConfirmation> {
        (**self).await_confirmation(ceremony_id).await
    }
}
