//! Explicit-history IIR filter.
//!
//! Evaluates the linear difference equation over windows of past raw and
//! past filtered samples pulled from ring buffers:
//!
//! ```text
//! y = ( sum_{i=0..nB-1} b[i] x[nB-1-i] - sum_{i=1..nA-1} a[i] y[nA-1-i] ) / a[0]
//! ```
//!
//! Nothing is carried between calls, so correctness rests entirely on the
//! caller passing correctly ordered windows each tick. It exists to
//! cross-check [`StreamingFilter`](super::StreamingFilter).

use eeg_types::HistoryBackend;
use ndarray::{Array1, Array2};
use tracing::debug;

use super::coefficients::FilterCoefficients;
use crate::error::{SignalError, SignalResult};

/// Precomputed per-backend state.
#[derive(Debug, Clone)]
enum Kernel {
    Plain,
    Matrix {
        /// `b` reversed so it lines up with an oldest-first raw window
        b_rev: Array1<f64>,
        /// `a[1..]` reversed to line up with an oldest-first filtered window
        a_rev: Array1<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct HistoryFilter {
    coeffs: FilterCoefficients,
    kernel: Kernel,
}

impl HistoryFilter {
    pub fn new(coeffs: FilterCoefficients, backend: HistoryBackend) -> Self {
        debug!(nb = coeffs.nb(), na = coeffs.na(), ?backend, "creating history filter");
        let kernel = match backend {
            HistoryBackend::Plain => Kernel::Plain,
            HistoryBackend::Matrix => Kernel::Matrix {
                b_rev: coeffs.b().iter().rev().copied().collect(),
                a_rev: coeffs.a()[1..].iter().rev().copied().collect(),
            },
        };
        Self { coeffs, kernel }
    }

    pub fn backend(&self) -> HistoryBackend {
        match self.kernel {
            Kernel::Plain => HistoryBackend::Plain,
            Kernel::Matrix { .. } => HistoryBackend::Matrix,
        }
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coeffs
    }

    /// History lengths the caller must extract each tick:
    /// `(raw samples, filtered samples)` = `(nB, nA - 1)`.
    pub fn required_history(&self) -> (usize, usize) {
        (self.coeffs.nb(), self.coeffs.na() - 1)
    }

    /// Computes the next filtered sample for every channel.
    ///
    /// `x` is the `[nB, M]` raw window ending with the current sample and
    /// `y_hist` the `[nA - 1, M]` window of previous outputs, both oldest
    /// first. `out` receives `M` values.
    pub fn transform(&self, x: &Array2<f64>, y_hist: &Array2<f64>, out: &mut [f64]) -> SignalResult<()> {
        let (nb, ny) = self.required_history();
        let channels = out.len();
        if x.nrows() != nb {
            return Err(SignalError::shape("raw history rows", nb, x.nrows()));
        }
        if y_hist.nrows() != ny {
            return Err(SignalError::shape("filtered history rows", ny, y_hist.nrows()));
        }
        if x.ncols() != channels {
            return Err(SignalError::shape("raw history channels", channels, x.ncols()));
        }
        if y_hist.ncols() != channels {
            return Err(SignalError::shape("filtered history channels", channels, y_hist.ncols()));
        }

        match &self.kernel {
            Kernel::Plain => self.transform_plain(x, y_hist, out),
            Kernel::Matrix { b_rev, a_rev } => {
                let mut acc = b_rev.dot(x);
                if ny > 0 {
                    acc -= &a_rev.dot(y_hist);
                }
                let a0 = self.coeffs.a()[0];
                for (o, v) in out.iter_mut().zip(acc.iter()) {
                    *o = v / a0;
                }
            }
        }
        Ok(())
    }

    pub fn transform_sample(&self, x: &Array2<f64>, y_hist: &Array2<f64>) -> SignalResult<Vec<f64>> {
        let mut out = vec![0.0; x.ncols()];
        self.transform(x, y_hist, &mut out)?;
        Ok(out)
    }

    fn transform_plain(&self, x: &Array2<f64>, y_hist: &Array2<f64>, out: &mut [f64]) {
        let b = self.coeffs.b();
        let a = self.coeffs.a();
        let (nb, na) = (b.len(), a.len());
        for (c, o) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (i, bi) in b.iter().enumerate() {
                acc += bi * x[(nb - 1 - i, c)];
            }
            for (i, ai) in a.iter().enumerate().skip(1) {
                acc -= ai * y_hist[(na - 1 - i, c)];
            }
            *o = acc / a[0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn coeffs() -> FilterCoefficients {
        FilterCoefficients::new(vec![0.2, 0.3, 0.1], vec![1.0, -0.5, 0.2]).unwrap()
    }

    #[test]
    fn test_hand_computed_output() {
        // x oldest-first: x[n-2]=1, x[n-1]=2, x[n]=3; y[n-2]=4, y[n-1]=5
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![[4.0], [5.0]];
        let expected = 0.2 * 3.0 + 0.3 * 2.0 + 0.1 * 1.0 - (-0.5 * 5.0) - 0.2 * 4.0;
        for backend in [HistoryBackend::Plain, HistoryBackend::Matrix] {
            let filter = HistoryFilter::new(coeffs(), backend);
            let out = filter.transform_sample(&x, &y).unwrap();
            assert!((out[0] - expected).abs() < 1e-12, "{:?}: {} vs {}", backend, out[0], expected);
        }
    }

    #[test]
    fn test_divides_by_a0() {
        let c = FilterCoefficients::new(vec![2.0], vec![4.0]).unwrap();
        let filter = HistoryFilter::new(c, HistoryBackend::Matrix);
        let x = array![[3.0, 5.0]];
        let out = filter.transform_sample(&x, &Array2::zeros((0, 2))).unwrap();
        assert_eq!(out, vec![1.5, 2.5]);
    }

    #[test]
    fn test_rejects_wrong_window_shapes() {
        let filter = HistoryFilter::new(coeffs(), HistoryBackend::Plain);
        assert_eq!(filter.required_history(), (3, 2));
        let mut out = [0.0; 2];
        let zeros = |r: usize, c: usize| Array2::<f64>::zeros((r, c));
        assert!(filter.transform(&zeros(2, 2), &zeros(2, 2), &mut out).is_err());
        assert!(filter.transform(&zeros(3, 2), &zeros(3, 2), &mut out).is_err());
        assert!(filter.transform(&zeros(3, 1), &zeros(2, 2), &mut out).is_err());
        assert!(filter.transform(&zeros(3, 2), &zeros(2, 2), &mut out).is_ok());
    }

    #[test]
    fn test_backends_agree_on_random_windows() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let c = FilterCoefficients::new(
            (0..9).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            std::iter::once(1.0).chain((0..6).map(|_| rng.gen_range(-0.3..0.3))).collect(),
        )
        .unwrap();
        let plain = HistoryFilter::new(c.clone(), HistoryBackend::Plain);
        let matrix = HistoryFilter::new(c, HistoryBackend::Matrix);
        assert_eq!(matrix.backend(), HistoryBackend::Matrix);

        for _ in 0..50 {
            let x = Array2::from_shape_fn((9, 4), |_| rng.gen_range(-10.0..10.0));
            let y = Array2::from_shape_fn((6, 4), |_| rng.gen_range(-10.0..10.0));
            let p = plain.transform_sample(&x, &y).unwrap();
            let m = matrix.transform_sample(&x, &y).unwrap();
            for (pv, mv) in p.iter().zip(m.iter()) {
                assert!((pv - mv).abs() < 1e-9);
            }
        }
    }
}
