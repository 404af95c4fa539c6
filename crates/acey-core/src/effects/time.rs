//! Physical time effects.
//!
//! The ceremony never reads the system clock directly. Deadlines, the
//! time-delay gate and rehydration are all computed from
//! [`PhysicalTimeEffects::physical_time`], so tests drive the ceremony with
//! a manual clock.

use crate::AceyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Wall-clock reading in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
    /// Optional clock uncertainty in milliseconds
    pub uncertainty: Option<u64>,
}

impl PhysicalTime {
    /// A reading with no uncertainty bound.
    pub fn exact(ts_ms: u64) -> Self {
        Self {
            ts_ms,
            uncertainty: None,
        }
    }
}

/// Wall-clock time for timestamps, deadlines and cooperative sleeping.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    async fn physical_time(&self) -> AceyResult<PhysicalTime>;

    /// Suspend the caller for `ms` milliseconds of this clock's time.
    async fn sleep_ms(&self, ms: u64) -> AceyResult<()>;
}

#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for std::sync::Arc<T> {
    async fn physical_time(&self) -> AceyResult<PhysicalTime> {
        (**self).physical_time().await
    }

    async fn sleep_ms(&self, ms: u64) -> AceyResult<()> {
        (**self).sleep_ms(ms).await
    }
}
