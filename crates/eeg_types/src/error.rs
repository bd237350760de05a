use thiserror::Error;

/// Errors raised while validating filter or conditioner configuration.
///
/// These only ever surface at construction time. Once a filter has been
/// built its coefficients are immutable and per-sample work cannot fail
/// for configuration reasons.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown filter pass type: '{0}'")]
    UnknownPassType(String),

    #[error("filter order must be between 1 and {max}, got {order}")]
    InvalidOrder { order: usize, max: usize },

    #[error("invalid cutoff {hz} Hz: {reason}")]
    InvalidCutoff { hz: f64, reason: String },

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
