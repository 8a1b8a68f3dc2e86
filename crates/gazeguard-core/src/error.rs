//! Error types for the GazeGuard core crate.
//!
//! This module provides error handling using [`thiserror`] for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Error Hierarchy
//!
//! - [`CoreError`]: Top-level error type for core data validation and state
//! - [`LandmarkError`]: Errors specific to landmark table access
//!
//! Missing landmarks during classification are intentionally NOT errors at
//! this level; classifiers degrade to neutral results instead. These types
//! cover genuinely invalid input, such as a confidence outside [0, 1] or a
//! malformed rotation matrix.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for GazeGuard core data types.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Landmark table error
    #[error("Landmark error: {0}")]
    Landmark(#[from] LandmarkError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Invalid state for the requested operation
    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl CoreError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors describe transient per-frame conditions; the
    /// caller may skip the frame and continue. Non-recoverable errors
    /// indicate misconfiguration or a programming bug.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Landmark(e) => e.is_recoverable(),
            Self::Configuration { .. }
            | Self::Validation { .. }
            | Self::InvalidState { .. }
            | Self::Internal { .. } => false,
        }
    }
}

/// Errors related to landmark table construction and access.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LandmarkError {
    /// Landmark index outside the supported table
    #[error("Unknown landmark index: {index}")]
    UnknownIndex {
        /// The raw index that failed to map
        index: u8,
    },

    /// Coordinate outside the normalized image space
    #[error("Coordinate {axis}={value} outside normalized range [0.0, 1.0]")]
    CoordinateOutOfRange {
        /// Axis name ("x" or "y")
        axis: &'static str,
        /// The offending value
        value: f32,
    },

    /// Not enough landmarks present for the requested computation
    #[error("Insufficient landmarks: need {required}, have {available}")]
    InsufficientLandmarks {
        /// Minimum required landmark count
        required: usize,
        /// Landmarks actually present
        available: usize,
    },
}

impl LandmarkError {
    /// Returns `true` if this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientLandmarks { .. } => true,
            Self::UnknownIndex { .. } | Self::CoordinateOutOfRange { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_display() {
        let err = CoreError::configuration("Invalid threshold value");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Invalid threshold"));
    }

    #[test]
    fn test_landmark_error_recoverable() {
        let recoverable = LandmarkError::InsufficientLandmarks {
            required: 4,
            available: 2,
        };
        assert!(recoverable.is_recoverable());

        let non_recoverable = LandmarkError::UnknownIndex { index: 99 };
        assert!(!non_recoverable.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let landmark_err = LandmarkError::UnknownIndex { index: 42 };
        let core_err: CoreError = landmark_err.into();
        assert!(matches!(core_err, CoreError::Landmark(_)));
    }

    #[test]
    fn test_invalid_state_error() {
        let err = CoreError::invalid_state("Monitoring", "Calibrating");
        assert!(err.to_string().contains("Monitoring"));
        assert!(err.to_string().contains("Calibrating"));
        assert!(!err.is_recoverable());
    }
}
