//! # Error Types
//!
//! Structured error types for tape_core. Every failure in parsing,
//! tokenizing, evaluating, or driving a session comes back as a
//! [`CalcError`] value that the presentation layer can branch on and show
//! directly to the user.
//!
//! ## Example
//!
//! ```rust
//! use tape_core::errors::{CalcError, CalcResult};
//!
//! fn require_divisor(divisor: f64) -> CalcResult<f64> {
//!     if divisor == 0.0 {
//!         return Err(CalcError::divide_by_zero("12\" / 0"));
//!     }
//!     Ok(divisor)
//! }
//!
//! let err = require_divisor(0.0).unwrap_err();
//! assert_eq!(err.to_string(), "Cannot divide by zero");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tape_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for measurement and calculator operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Text does not match any recognized measurement or expression form
    #[error("Invalid measurement '{text}': {reason}")]
    Format { text: String, reason: String },

    /// Division by a zero-valued operand or a zero percent
    #[error("Cannot divide by zero")]
    DivideByZero { expression: String },

    /// Operation is undefined for the given value (square root of a negative, overflow)
    #[error("Cannot compute {operation} of {value}: {reason}")]
    Domain {
        operation: String,
        value: String,
        reason: String,
    },

    /// A chain entry failed to re-evaluate during undo.
    ///
    /// The session recovers from this itself; callers never see it.
    #[error("Replay failed at '{entry}': {reason}")]
    Replay { entry: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Settings schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create a Format error
    pub fn format(text: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Format {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Create a DivideByZero error
    pub fn divide_by_zero(expression: impl Into<String>) -> Self {
        CalcError::DivideByZero {
            expression: expression.into(),
        }
    }

    /// Create a Domain error
    pub fn domain(operation: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Domain {
            operation: operation.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Replay error
    pub fn replay(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Replay {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CalcError::Format { .. } | CalcError::DivideByZero { .. } | CalcError::Domain { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Format { .. } => "FORMAT_ERROR",
            CalcError::DivideByZero { .. } => "DIVIDE_BY_ZERO",
            CalcError::Domain { .. } => "DOMAIN_ERROR",
            CalcError::Replay { .. } => "REPLAY_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::format("12'' 6", "no measurement form matches");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Format\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::divide_by_zero("6 / 0").error_code(), "DIVIDE_BY_ZERO");
        assert_eq!(CalcError::replay("x", "bad").error_code(), "REPLAY_ERROR");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(CalcError::divide_by_zero("1/0").to_string(), "Cannot divide by zero");
        let err = CalcError::domain("square root", "-4\"", "value is negative");
        assert_eq!(err.to_string(), "Cannot compute square root of -4\": value is negative");
        assert!(err.is_user_error());
        assert!(!CalcError::replay("x", "y").is_user_error());
    }
}
