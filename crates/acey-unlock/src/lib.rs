//! # Acey Unlock
//!
//! Secure unlock ceremony: the multi-stage, time-gated protocol that
//! restores a locked-down system to normal operation.
//!
//! ## Stages
//!
//! ```text
//! BiometricPending ─► TimeDelayPending ─► DesktopConfirmationPending
//!        ─► IntegrityCheckPending ─► RehydrationPending ─► Completed
//!
//! any non-terminal stage ─► Failed | Cancelled
//! ```
//!
//! ## Layout
//!
//! - [`types`]: the request, stages, statuses and results
//! - [`event`]: the events that drive a request and the transitions they cause
//! - [`state_machine`]: the pure transition function
//! - [`ceremony`]: the async driver that calls out to capabilities
//! - [`scheduler`]: periodic expiry and timed-stage wakes
//! - [`facts`]: audit facts emitted on every step
//! - [`service`]: caller-facing request/response surface
//!
//! ## Usage
//!
//! ```ignore
//! use acey_unlock::{CeremonyScheduler, UnlockCeremony};
//!
//! let ceremony = UnlockCeremony::with_defaults(effects)?;
//! let request = ceremony.start("emergency lock recovery").await?;
//! let outcome = CeremonyScheduler::new(ceremony.clone())
//!     .run_until_terminal(request.id())
//!     .await?;
//! ```

#![forbid(unsafe_code)]

pub mod ceremony;
pub mod config;
pub mod effects;
pub mod errors;
pub mod event;
pub mod facts;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod state_machine;
mod tasks;
pub mod types;

pub use ceremony::{TickReport, UnlockCeremony, CEREMONY_RISK_LEVEL};
pub use config::{StageTimings, UnlockCeremonyConfig};
pub use effects::UnlockCeremonyEffects;
pub use errors::{ErrorCode, UnlockError, UnlockResult};
pub use event::{CeremonyEvent, DiscardReason, Transition};
pub use facts::{UnlockCeremonyFact, UNLOCK_FACT_TYPE_ID};
pub use registry::CeremonyRegistry;
pub use scheduler::CeremonyScheduler;
pub use service::{
    AcknowledgeCeremonyRequest, CancelCeremonyRequest, CeremonyService, CeremonyStatusQuery,
    ServiceReply, ServiceRequest, ServiceResponse, StageCallback, StartCeremonyRequest,
};
pub use state_machine::apply;
pub use types::{
    CeremonyFailure, CeremonyResults, CeremonyStage, CeremonyStatus, UnlockRequest,
    MAX_REASON_CHARS,
};
