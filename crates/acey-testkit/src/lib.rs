//! Acey Testing Infrastructure
//!
//! Deterministic, stateful effect handlers for driving unlock ceremonies in
//! tests. Production handlers live in `acey-effects` and stay stateless;
//! everything here records calls or holds scripted answers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust,ignore
//! use acey_testkit::CeremonyHarness;
//! use acey_unlock::UnlockCeremony;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let harness = CeremonyHarness::new();
//!     harness.desktop.confirm();
//!     let ceremony = UnlockCeremony::with_defaults(harness.effects()).unwrap();
//!     let request = ceremony.start("emergency lock recovery").await.unwrap();
//!     harness.clock.advance_ms(60_000);
//!     ceremony.tick().await.unwrap();
//! }
//! ```

pub mod audit;
pub mod biometric;
pub mod desktop;
pub mod harness;
pub mod integrity;
pub mod random;
pub mod time;

pub use audit::RecordingAudit;
pub use biometric::ScriptedBiometric;
pub use desktop::GatedDesktop;
pub use harness::{CeremonyHarness, MockCeremonyEffects};
pub use integrity::ScriptedIntegrityScanner;
pub use random::DeterministicRandom;
pub use time::{ManualClock, DEFAULT_START_MS};
