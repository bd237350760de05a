//! Streaming Direct Form II Transposed filter with per-channel state.

use ndarray::Array2;
use tracing::debug;

use super::coefficients::{DelayLine, FilterCoefficients};
use crate::error::{SignalError, SignalResult};

/// Multichannel recursive IIR filter.
///
/// Every channel runs the same coefficients against its own delay line;
/// channels never interact.
#[derive(Debug, Clone)]
pub struct StreamingFilter {
    coeffs: FilterCoefficients,
    lines: Vec<DelayLine>,
}

impl StreamingFilter {
    pub fn new(coeffs: FilterCoefficients, channels: usize) -> SignalResult<Self> {
        if channels == 0 {
            return Err(eeg_types::ConfigError::InvalidParameter {
                name: "channels",
                reason: "filter needs at least one channel".into(),
            }
            .into());
        }
        debug!(nb = coeffs.nb(), na = coeffs.na(), channels, "creating streaming filter");
        let lines = (0..channels).map(|_| coeffs.delay_line()).collect();
        Ok(Self { coeffs, lines })
    }

    pub fn channels(&self) -> usize {
        self.lines.len()
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coeffs
    }

    /// Clears every channel's state back to zero.
    pub fn reset(&mut self) {
        self.lines.iter_mut().for_each(DelayLine::reset);
    }

    /// Filters one multichannel sample into `out`.
    pub fn transform(&mut self, x: &[f64], out: &mut [f64]) -> SignalResult<()> {
        let channels = self.lines.len();
        if x.len() != channels {
            return Err(SignalError::shape("filter input", channels, x.len()));
        }
        if out.len() != channels {
            return Err(SignalError::shape("filter output", channels, out.len()));
        }
        for ((&xc, line), yc) in x.iter().zip(self.lines.iter_mut()).zip(out.iter_mut()) {
            *yc = self.coeffs.advance(xc, line)?;
        }
        Ok(())
    }

    pub fn transform_sample(&mut self, x: &[f64]) -> SignalResult<Vec<f64>> {
        let mut out = vec![0.0; self.lines.len()];
        self.transform(x, &mut out)?;
        Ok(out)
    }

    /// Filters a `[k, channels]` chronological block, oldest row first.
    pub fn transform_block(&mut self, block: &Array2<f64>) -> SignalResult<Array2<f64>> {
        if block.ncols() != self.lines.len() {
            return Err(SignalError::shape("filter block width", self.lines.len(), block.ncols()));
        }
        let mut out = Array2::zeros(block.raw_dim());
        for (row, mut filtered) in block.rows().into_iter().zip(out.rows_mut()) {
            for ((&xc, line), yc) in row.iter().zip(self.lines.iter_mut()).zip(filtered.iter_mut()) {
                *yc = self.coeffs.advance(xc, line)?;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passes_input_through() {
        let mut filter = StreamingFilter::new(FilterCoefficients::identity(), 3).unwrap();
        for i in 0..50 {
            let x = [i as f64, -(i as f64) * 0.5, (i as f64).sin()];
            assert_eq!(filter.transform_sample(&x).unwrap(), x.to_vec());
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let coeffs = FilterCoefficients::new(vec![0.3, 0.2], vec![1.0, -0.4]).unwrap();
        let mut both = StreamingFilter::new(coeffs.clone(), 2).unwrap();
        let mut single = StreamingFilter::new(coeffs, 1).unwrap();

        for i in 0..100 {
            let x0 = ((i * 7) % 11) as f64 - 5.0;
            let y = both.transform_sample(&[x0, 1000.0]).unwrap();
            let y0 = single.transform_sample(&[x0]).unwrap();
            assert_eq!(y[0], y0[0]);
        }
    }

    #[test]
    fn test_shape_errors() {
        let mut filter = StreamingFilter::new(FilterCoefficients::identity(), 2).unwrap();
        let mut out = [0.0; 2];
        assert!(matches!(
            filter.transform(&[1.0], &mut out),
            Err(SignalError::ShapeMismatch { what: "filter input", .. })
        ));
        let mut short = [0.0; 1];
        assert!(matches!(
            filter.transform(&[1.0, 2.0], &mut short),
            Err(SignalError::ShapeMismatch { what: "filter output", .. })
        ));
        assert!(StreamingFilter::new(FilterCoefficients::identity(), 0).is_err());
    }

    #[test]
    fn test_block_matches_sample_by_sample() {
        let coeffs = FilterCoefficients::new(vec![0.1, 0.2, 0.1], vec![1.0, -0.9, 0.3]).unwrap();
        let mut block_filter = StreamingFilter::new(coeffs.clone(), 2).unwrap();
        let mut step_filter = StreamingFilter::new(coeffs, 2).unwrap();

        let block = Array2::from_shape_fn((32, 2), |(i, c)| if c == 0 { i as f64 } else { (i as f64 * 0.3).cos() });
        let filtered = block_filter.transform_block(&block).unwrap();

        for (row, out) in block.rows().into_iter().zip(filtered.rows()) {
            assert_eq!(out.to_vec(), step_filter.transform_sample(&row.to_vec()).unwrap());
        }
        assert!(block_filter.transform_block(&Array2::zeros((4, 3))).is_err());
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let coeffs = FilterCoefficients::new(vec![0.5, 0.5], vec![1.0, -0.25]).unwrap();
        let mut used = StreamingFilter::new(coeffs.clone(), 1).unwrap();
        for i in 0..10 {
            used.transform_sample(&[i as f64]).unwrap();
        }
        used.reset();
        let mut fresh = StreamingFilter::new(coeffs, 1).unwrap();
        assert_eq!(used.transform_sample(&[5.0]).unwrap(), fresh.transform_sample(&[5.0]).unwrap());
        assert_eq!(used.channels(), 1);
    }
}
