//! # Acey Effects
//!
//! Stateless production handlers for the effect traits defined in
//! `acey-core`, and the [`CeremonyEffectSystem`] that composes them.
//!
//! **Constraint**: no mock handlers here. Deterministic test handlers
//! belong in `acey-testkit`.

#![forbid(unsafe_code)]

pub mod audit;
pub mod biometric;
pub mod composite;
pub mod random;
pub mod time;

pub use audit::TracingAuditHandler;
pub use biometric::FallbackBiometricHandler;
pub use composite::CeremonyEffectSystem;
pub use random::SystemRandomHandler;
pub use time::RealTimeHandler;
