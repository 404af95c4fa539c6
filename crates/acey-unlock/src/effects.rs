//! Effect composition for unlock ceremonies.
//!
//! The ceremony driver needs exactly these capabilities:
//!
//! - **PhysicalTimeEffects**: timestamps, expiry checks, scheduler sleeps
//! - **RandomEffects**: ceremony identifiers
//! - **BiometricEffects**: the first stage
//! - **DesktopConfirmationEffects**: the out-of-band approval
//! - **IntegrityScanEffects**: the integrity battery
//! - **AuditEffects**: lifecycle facts
//!
//! Any type implementing all six gets [`UnlockCeremonyEffects`] through the
//! blanket impl below.

use acey_core::effects::{
    AuditEffects, BiometricEffects, DesktopConfirmationEffects, IntegrityScanEffects,
    PhysicalTimeEffects, RandomEffects,
};

/// Composed effects required by [`crate::UnlockCeremony`].
pub trait UnlockCeremonyEffects:
    PhysicalTimeEffects
    + RandomEffects
    + BiometricEffects
    + DesktopConfirmationEffects
    + IntegrityScanEffects
    + AuditEffects
    + Send
    + Sync
    + 'static
{
}

impl<T> UnlockCeremonyEffects for T where
    T: PhysicalTimeEffects
        + RandomEffects
        + BiometricEffects
        + DesktopConfirmationEffects
        + IntegrityScanEffects
        + AuditEffects
        + Send
        + Sync
        + 'static
{
}
