use crate::error::{SignalError, SignalResult};

/// Immutable IIR coefficients `b` (numerator) and `a` (denominator).
///
/// The raw arrays are kept as supplied for the explicit-history form. The
/// recursive form works on a copy normalised by `a[0]` and zero-padded to
/// `max(nB, nA)`, so neither form needs `nB >= nA`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
    b_norm: Vec<f64>,
    a_norm: Vec<f64>,
}

impl FilterCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> SignalResult<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(SignalError::InvalidCoefficients {
                message: format!("need at least one b and one a coefficient, got nB={} nA={}", b.len(), a.len()),
            });
        }
        if b.iter().chain(a.iter()).any(|v| !v.is_finite()) {
            return Err(SignalError::InvalidCoefficients { message: "coefficients must be finite".into() });
        }
        if a[0] == 0.0 {
            return Err(SignalError::InvalidCoefficients { message: "a[0] must be non-zero".into() });
        }

        let len = b.len().max(a.len());
        let a0 = a[0];
        let mut b_norm: Vec<f64> = b.iter().map(|v| v / a0).collect();
        let mut a_norm: Vec<f64> = a.iter().map(|v| v / a0).collect();
        b_norm.resize(len, 0.0);
        a_norm.resize(len, 0.0);

        Ok(Self { b, a, b_norm, a_norm })
    }

    /// `b = [1]`, `a = [1]`: passes the input through unchanged.
    pub fn identity() -> Self {
        Self {
            b: vec![1.0],
            a: vec![1.0],
            b_norm: vec![1.0],
            a_norm: vec![1.0],
        }
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    pub fn nb(&self) -> usize {
        self.b.len()
    }

    pub fn na(&self) -> usize {
        self.a.len()
    }

    /// Number of true delay terms carried by the recursive form.
    pub fn delay_len(&self) -> usize {
        self.b_norm.len() - 1
    }

    /// A zeroed delay line sized for these coefficients.
    pub fn delay_line(&self) -> DelayLine {
        DelayLine::zeros(self.delay_len())
    }

    /// One Direct Form II Transposed step.
    ///
    /// Updates `state` in place and returns the filtered sample. A delay
    /// line sized for other coefficients is rejected untouched.
    #[inline]
    pub fn advance(&self, x: f64, state: &mut DelayLine) -> SignalResult<f64> {
        let b = &self.b_norm;
        let a = &self.a_norm;
        let z = &mut state.z;
        if z.len() != b.len() - 1 {
            return Err(SignalError::shape("delay line", b.len() - 1, z.len()));
        }

        let y = match z.first() {
            Some(&z0) => b[0] * x + z0,
            None => return Ok(b[0] * x),
        };
        let last = z.len();
        for i in 1..last {
            z[i - 1] = b[i] * x + z[i] - a[i] * y;
        }
        z[last - 1] = b[last] * x - a[last] * y;
        Ok(y)
    }

    /// First `n` samples of the impulse response, evaluated straight from
    /// the difference equation.
    pub fn impulse_response(&self, n: usize) -> Vec<f64> {
        let mut h = vec![0.0; n];
        for k in 0..n {
            let mut acc = self.b.get(k).copied().unwrap_or(0.0);
            for i in 1..self.a.len().min(k + 1) {
                acc -= self.a[i] * h[k - i];
            }
            h[k] = acc / self.a[0];
        }
        h
    }
}

/// Per-channel Direct Form II Transposed state.
///
/// Holds only true delay terms; the filter output is returned separately
/// by [`FilterCoefficients::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct DelayLine {
    z: Vec<f64>,
}

impl DelayLine {
    pub(crate) fn zeros(len: usize) -> Self {
        Self { z: vec![0.0; len] }
    }

    pub fn reset(&mut self) {
        self.z.iter_mut().for_each(|v| *v = 0.0);
    }
}
