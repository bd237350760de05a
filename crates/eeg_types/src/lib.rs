//! Shared types for the EEG signal-conditioning workspace
//!
//! This crate contains the value types and configuration shared between the
//! conditioning core and the binaries driving it: filter specifications,
//! conditioner settings and the configuration error taxonomy.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::*;
pub use error::*;
