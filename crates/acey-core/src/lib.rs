//! # Acey Core
//!
//! Foundation types for the Acey secure unlock ceremony.
//!
//! ## What Belongs Here
//!
//! - The unified [`AceyError`] returned by every effect boundary
//! - Opaque identifiers ([`CeremonyId`])
//! - Effect traits for the capabilities the ceremony consumes: physical
//!   time, randomness, biometric authentication, desktop confirmation,
//!   integrity scanning and audit
//!
//! ## What Does NOT Belong Here
//!
//! - Effect handler implementations (belong in `acey-effects` / `acey-testkit`)
//! - Ceremony state and transition rules (belong in `acey-unlock`)

#![forbid(unsafe_code)]

pub mod effects;
pub mod errors;
pub mod identifiers;

pub use errors::{AceyError, AceyResult};
pub use identifiers::CeremonyId;
