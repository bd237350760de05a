//! Streaming signal conditioning for EEG acquisition.
//!
//! A fixed-capacity multichannel [`RingBuffer`] paired with IIR filtering
//! that runs one sample at a time: the recursive [`StreamingFilter`]
//! (Direct Form II Transposed) and the explicit-history [`HistoryFilter`]
//! used to cross-check it. [`Conditioner`] wires both into the per-tick
//! cycle and hands periodic windows to downstream analysis.

pub mod conditioner;
pub mod error;
pub mod filter;
pub mod ring_buffer;
pub mod synth;


// Re-export commonly used types
pub use conditioner::*;
pub use error::*;
pub use filter::*;
pub use ring_buffer::*;
