//! Unified error type for Acey effect boundaries
//!
//! Every effect trait in this crate returns [`AceyError`]. Ceremony-level
//! input errors live in `acey-unlock`; this type covers what an external
//! capability or infrastructure handler can report.

use serde::{Deserialize, Serialize};

/// Unified error type for all Acey effect operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AceyError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// An external capability (sensor, peer, scanner) cannot be reached
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Error message naming the missing capability
        message: String,
    },

    /// Operation did not finish in time
    #[error("Timeout after {timeout_ms}ms")]
    Timeout {
        /// Elapsed budget in milliseconds
        timeout_ms: u64,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl AceyError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an unavailable-capability error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Acey effect operations
pub type AceyResult<T> = std::result::Result<T, AceyError>;

impl From<serde_json::Error> for AceyError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for AceyError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            std::io::ErrorKind::TimedOut => Self::timeout(0),
            _ => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AceyError::invalid("empty reason");
        assert!(matches!(err, AceyError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: empty reason");
    }

    #[test]
    fn test_unavailable_display() {
        let err = AceyError::unavailable("desktop peer offline");
        assert_eq!(err.to_string(), "Unavailable: desktop peer offline");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
        let err = AceyError::from(io_err);
        assert!(matches!(err, AceyError::NotFound { .. }));
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err = AceyError::from(json_err);
        assert!(matches!(err, AceyError::Serialization { .. }));
    }
}
