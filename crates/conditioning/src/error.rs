//! Error types for the conditioning core

use eeg_types::ConfigError;
use thiserror::Error;

/// Errors raised by ring buffers and filters.
///
/// Everything except `ShapeMismatch` can only happen at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cannot extract {requested} samples from a buffer of capacity {capacity}")]
    ExtractOutOfRange { requested: usize, capacity: usize },

    #[error("invalid filter coefficients: {message}")]
    InvalidCoefficients { message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SignalError {
    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        SignalError::ShapeMismatch { what, expected, actual }
    }
}

/// Result type for conditioning operations
pub type SignalResult<T> = Result<T, SignalError>;
