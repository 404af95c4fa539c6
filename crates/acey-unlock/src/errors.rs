//! Caller-facing ceremony errors.
//!
//! Only input errors and infrastructure faults surface as `Err`. Biometric
//! rejection, failed integrity checks, capability outages and expiry all
//! become `Failed` state on the request instead.

use crate::types::CeremonyStatus;
use acey_core::{AceyError, CeremonyId};
use serde::{Deserialize, Serialize};

/// Errors returned by ceremony operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnlockError {
    /// The supplied reason is empty or unusable
    #[error("Invalid reason: {message}")]
    InvalidReason {
        /// Why the reason was rejected
        message: String,
    },

    /// Another ceremony is still pending
    #[error("Ceremony already active: {active}")]
    CeremonyAlreadyActive {
        /// The ceremony that is currently pending
        active: CeremonyId,
    },

    /// Cancel was requested for a ceremony that is no longer pending
    #[error("Ceremony {id} is not cancellable in status {status}")]
    NotCancellable {
        /// Target ceremony
        id: CeremonyId,
        /// Its status at the time of the request
        status: CeremonyStatus,
    },

    /// No ceremony with this id is known
    #[error("Ceremony not found: {id}")]
    NotFound {
        /// Requested ceremony
        id: CeremonyId,
    },

    /// Acknowledge was requested for a ceremony that is still pending
    #[error("Ceremony {id} has not reached a terminal outcome")]
    NotTerminal {
        /// Target ceremony
        id: CeremonyId,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Which constraint was violated
        message: String,
    },

    /// An infrastructure effect (clock, id source) failed
    #[error("Effect error: {0}")]
    Effect(#[from] AceyError),
}

impl UnlockError {
    /// Create an invalid reason error
    pub fn invalid_reason(message: impl Into<String>) -> Self {
        Self::InvalidReason {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Stable error code for the service surface.
    pub fn code(&self) -> ErrorCode {
        match self {
            UnlockError::InvalidReason { .. } => ErrorCode::InvalidReason,
            UnlockError::CeremonyAlreadyActive { .. } => ErrorCode::CeremonyAlreadyActive,
            UnlockError::NotCancellable { .. } => ErrorCode::NotCancellable,
            UnlockError::NotFound { .. } => ErrorCode::NotFound,
            UnlockError::NotTerminal { .. } => ErrorCode::NotTerminal,
            UnlockError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            UnlockError::Effect(_) => ErrorCode::Internal,
        }
    }
}

/// Wire-level error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Reason missing or empty
    InvalidReason,
    /// A ceremony is already pending
    CeremonyAlreadyActive,
    /// Ceremony is not pending
    NotCancellable,
    /// Unknown ceremony id
    NotFound,
    /// Ceremony is still pending
    NotTerminal,
    /// Configuration rejected
    InvalidConfig,
    /// Infrastructure failure
    Internal,
}

/// Result alias for ceremony operations.
pub type UnlockResult<T> = Result<T, UnlockError>;
