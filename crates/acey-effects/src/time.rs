//! Real time effect handler for production use
//!
//! Stateless implementation of `PhysicalTimeEffects` delegating to the
//! operating system clock and the tokio timer.

use acey_core::effects::{PhysicalTime, PhysicalTimeEffects};
use acey_core::AceyResult;
use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Real time handler for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    #[allow(clippy::disallowed_methods)]
    async fn physical_time(&self) -> AceyResult<PhysicalTime> {
        // SystemTime::now() is allowed in production handlers that implement effect traits.
        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        Ok(PhysicalTime::exact(ts_ms))
    }

    async fn sleep_ms(&self, ms: u64) -> AceyResult<()> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_real_time_is_monotonic_enough() {
        let handler = RealTimeHandler::new();
        let t1 = handler.physical_time().await.unwrap().ts_ms;
        handler.sleep_ms(5).await.unwrap();
        let t2 = handler.physical_time().await.unwrap().ts_ms;
        assert!(t2 >= t1);
        assert!(t1 > 0);
    }
}
