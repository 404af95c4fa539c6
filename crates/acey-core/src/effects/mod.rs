//! Effect interfaces consumed by the unlock ceremony.
//!
//! Each trait is one capability seam. Production handlers live in
//! `acey-effects`, deterministic ones in `acey-testkit`.

pub mod audit;
pub mod biometric;
pub mod desktop;
pub mod integrity;
pub mod random;
pub mod time;

pub use audit::{AuditEffects, AuditRecord};
pub use biometric::{BiometricAuthResult, BiometricEffects, RiskLevel};
pub use desktop::{DesktopConfirmation, DesktopConfirmationEffects};
pub use integrity::{IntegrityCheck, IntegrityScanEffects, STANDARD_INTEGRITY_BATTERY};
pub use random::RandomEffects;
pub use time::{PhysicalTime, PhysicalTimeEffects};
