//! Fixed-capacity multichannel ring buffer.
//!
//! Holds the most recent `capacity` samples of a `channels`-wide stream in a
//! flat `[capacity, channels]` block and hands out chronological windows of
//! the newest `k` samples, either sample-major or channel-major.

use eeg_types::ConfigError;
use ndarray::{aview1, Array2};
use tracing::debug;

use crate::error::{SignalError, SignalResult};

/// Modulo that stays in `[0, n)` for negative dividends.
///
/// Extraction walks `index - k + i`, which is negative whenever the window
/// reaches back across the wrap point.
#[inline]
pub fn wrap_index(a: isize, n: usize) -> usize {
    a.rem_euclid(n as isize) as usize
}

#[derive(Debug, Clone)]
pub struct RingBuffer {
    capacity: usize,
    channels: usize,
    /// Slot the next sample goes into
    index: usize,
    /// Samples written since the last `reset_pts`
    pts: usize,
    storage: Vec<f64>,
}

impl RingBuffer {
    /// Creates a zero-filled buffer of `capacity` samples by `channels`.
    pub fn new(capacity: usize, channels: usize) -> SignalResult<Self> {
        if capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "capacity",
                reason: "ring buffer needs room for at least one sample".into(),
            }
            .into());
        }
        if channels == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "channels",
                reason: "ring buffer needs at least one channel".into(),
            }
            .into());
        }
        debug!(capacity, channels, "creating ring buffer");
        Ok(Self {
            capacity,
            channels,
            index: 0,
            pts: 0,
            storage: vec![0.0; capacity * channels],
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Write cursor, always in `[0, capacity)`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Samples written since the last [`reset_pts`](Self::reset_pts).
    pub fn pts(&self) -> usize {
        self.pts
    }

    /// Restarts the analysis trigger counter. Storage and cursor are untouched.
    pub fn reset_pts(&mut self) {
        self.pts = 0;
    }

    /// Appends one sample (one value per channel), overwriting the oldest
    /// slot once the buffer is full.
    ///
    /// A sample of the wrong width is rejected and the buffer is left
    /// exactly as it was.
    pub fn update(&mut self, sample: &[f64]) -> SignalResult<()> {
        if sample.len() != self.channels {
            return Err(SignalError::shape("ring buffer sample", self.channels, sample.len()));
        }
        let start = self.index * self.channels;
        self.storage[start..start + self.channels].copy_from_slice(sample);
        self.index += 1;
        if self.index == self.capacity {
            self.index = 0;
        }
        self.pts += 1;
        Ok(())
    }

    /// The most recently written sample (zeros before the first update).
    pub fn latest(&self) -> &[f64] {
        self.slot(wrap_index(self.index as isize - 1, self.capacity))
    }

    /// Returns the newest `k` samples as a `[k, channels]` array, oldest first.
    pub fn extract(&self, k: usize) -> SignalResult<Array2<f64>> {
        let mut out = Array2::zeros((k, self.channels));
        self.extract_into(k, &mut out)?;
        Ok(out)
    }

    /// Like [`extract`](Self::extract), but writes into a caller-owned array
    /// so the per-tick history lookup does not allocate once it has the
    /// right shape.
    pub fn extract_into(&self, k: usize, out: &mut Array2<f64>) -> SignalResult<()> {
        self.check_extract(k)?;
        if out.dim() != (k, self.channels) {
            *out = Array2::zeros((k, self.channels));
        }
        let first = self.index as isize - k as isize;
        for i in 0..k {
            let slot = wrap_index(first + i as isize, self.capacity);
            out.row_mut(i).assign(&aview1(self.slot(slot)));
        }
        Ok(())
    }

    /// Returns the newest `k` samples as a `[channels, k]` array: row `c`
    /// is channel `c`'s time series, oldest first.
    pub fn extract_transposed(&self, k: usize) -> SignalResult<Array2<f64>> {
        let mut out = Array2::zeros((self.channels, k));
        self.extract_transposed_into(k, &mut out)?;
        Ok(out)
    }

    pub fn extract_transposed_into(&self, k: usize, out: &mut Array2<f64>) -> SignalResult<()> {
        self.check_extract(k)?;
        if out.dim() != (self.channels, k) {
            *out = Array2::zeros((self.channels, k));
        }
        let first = self.index as isize - k as isize;
        for i in 0..k {
            let slot = wrap_index(first + i as isize, self.capacity);
            out.column_mut(i).assign(&aview1(self.slot(slot)));
        }
        Ok(())
    }

    fn check_extract(&self, k: usize) -> SignalResult<()> {
        if k > self.capacity {
            return Err(SignalError::ExtractOutOfRange { requested: k, capacity: self.capacity });
        }
        Ok(())
    }

    #[inline]
    fn slot(&self, slot: usize) -> &[f64] {
        let start = slot * self.channels;
        &self.storage[start..start + self.channels]
    }
}
