//! Periodic driver for timed stages and the ceremony deadline.
//!
//! The scheduler owns no timers of its own: it sleeps through
//! [`PhysicalTimeEffects`](acey_core::effects::PhysicalTimeEffects) and calls
//! [`UnlockCeremony::tick`], so a manual clock drives it deterministically.

use crate::ceremony::UnlockCeremony;
use crate::effects::UnlockCeremonyEffects;
use crate::errors::UnlockResult;
use crate::types::UnlockRequest;
use acey_core::CeremonyId;
use tracing::debug;

/// Ticks a ceremony driver until a watched ceremony finishes.
#[derive(Debug, Clone)]
pub struct CeremonyScheduler<E: UnlockCeremonyEffects> {
    ceremony: UnlockCeremony<E>,
    tick_interval_ms: u64,
}

impl<E: UnlockCeremonyEffects> CeremonyScheduler<E> {
    /// Scheduler using the driver's configured tick interval.
    pub fn new(ceremony: UnlockCeremony<E>) -> Self {
        let tick_interval_ms = ceremony.config().tick_interval_ms;
        Self {
            ceremony,
            tick_interval_ms,
        }
    }

    /// Override the tick interval. Zero is raised to one millisecond.
    pub fn with_tick_interval(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms.max(1);
        self
    }

    /// Tick interval in milliseconds
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Tick until `id` reaches a terminal status and return its final
    /// snapshot.
    pub async fn run_until_terminal(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        self.run_until_terminal_with(id, |_| {}).await
    }

    /// Like [`Self::run_until_terminal`], calling `on_stage` whenever the
    /// watched ceremony is observed in a new stage.
    pub async fn run_until_terminal_with<F>(
        &self,
        id: CeremonyId,
        mut on_stage: F,
    ) -> UnlockResult<UnlockRequest>
    where
        F: FnMut(&UnlockRequest) + Send,
    {
        let mut last_stage = None;
        loop {
            self.ceremony.tick().await?;
            let snapshot = self.ceremony.snapshot(id)?;
            if last_stage != Some(snapshot.stage()) {
                last_stage = Some(snapshot.stage());
                on_stage(&snapshot);
            }
            if snapshot.is_terminal() {
                debug!(
                    ceremony_id = %id,
                    status = %snapshot.status(),
                    in_flight = self.ceremony.in_flight(),
                    "Scheduler finished"
                );
                return Ok(snapshot);
            }
            self.ceremony
                .effects()
                .sleep_ms(self.tick_interval_ms)
                .await?;
        }
    }
}
