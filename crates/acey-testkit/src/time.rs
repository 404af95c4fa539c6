//! Manually driven clock.

use acey_core::effects::{PhysicalTime, PhysicalTimeEffects};
use acey_core::AceyResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Start time used by [`ManualClock::default`]: 2023-11-14T22:13:20Z.
pub const DEFAULT_START_MS: u64 = 1_700_000_000_000;

/// Clock that only moves when told to.
///
/// `sleep_ms` advances the clock by the requested amount and yields once,
/// so spawned tasks get to run while a scheduler "sleeps".
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Current reading
    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    /// Move forward by `ms`
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute reading
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DEFAULT_START_MS)
    }
}

#[async_trait]
impl PhysicalTimeEffects for ManualClock {
    async fn physical_time(&self) -> AceyResult<PhysicalTime> {
        Ok(PhysicalTime::exact(self.now_ms()))
    }

    async fn sleep_ms(&self, ms: u64) -> AceyResult<()> {
        self.advance_ms(ms);
        tokio::task::yield_now().await;
        Ok(())
    }
}
