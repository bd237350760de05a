//! IIR filtering: coefficients, the recursive and explicit-history forms,
//! and coefficient providers.

pub mod coefficients;
pub mod design;
pub mod history;
pub mod recursive;

pub use coefficients::{DelayLine, FilterCoefficients};
pub use design::{ButterworthDesigner, CoefficientProvider};
pub use history::HistoryFilter;
pub use recursive::StreamingFilter;
