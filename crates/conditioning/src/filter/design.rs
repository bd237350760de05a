//! Coefficient providers.
//!
//! The conditioning core only needs a `(b, a)` pair per filter; where it
//! comes from is behind [`CoefficientProvider`]. [`ButterworthDesigner`]
//! builds lowpass and highpass responses out of second-order sections from
//! the `biquad` crate, and band responses from the analog prototype, then
//! multiplies everything into a single direct-form pair.

use std::f64::consts::PI;

use biquad::{Coefficients, ToHertz, Type};
use eeg_types::{ConfigError, FilterSpec, PassType};
use num_complex::Complex64;
use tracing::debug;

use super::coefficients::FilterCoefficients;
use crate::error::SignalResult;

/// Maps a filter specification to immutable coefficients.
pub trait CoefficientProvider {
    fn design(&self, sample_rate_hz: f64, spec: &FilterSpec) -> SignalResult<FilterCoefficients>;
}

/// Fixed coefficients, e.g. exported from another design tool. The
/// specification is ignored.
impl CoefficientProvider for FilterCoefficients {
    fn design(&self, _sample_rate_hz: f64, _spec: &FilterSpec) -> SignalResult<FilterCoefficients> {
        Ok(self.clone())
    }
}

/// Digital Butterworth designer (bilinear transform).
///
/// * lowpass / highpass: order-N Butterworth at `cutoff_hz`
/// * bandpass / bandstop: order-N prototype transformed onto the band
///   `[cutoff_hz, upper_cutoff_hz]`, both edges at half power
///
/// Band classes therefore yield `2 * order + 1` coefficients, the others
/// `order + 1`; `nB == nA` always.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButterworthDesigner;

impl CoefficientProvider for ButterworthDesigner {
    fn design(&self, sample_rate_hz: f64, spec: &FilterSpec) -> SignalResult<FilterCoefficients> {
        spec.validate(sample_rate_hz)?;
        let fs = sample_rate_hz;

        let poly = match spec.pass_type {
            PassType::Lowpass => butterworth(Edge::Low, fs, spec.cutoff_hz, spec.order)?,
            PassType::Highpass => butterworth(Edge::High, fs, spec.cutoff_hz, spec.order)?,
            PassType::Bandpass | PassType::Bandstop => {
                let upper = upper_cutoff(spec)?;
                band(spec.pass_type, fs, spec.cutoff_hz, upper, spec.order)
            }
        };

        debug!(
            pass_type = %spec.pass_type,
            order = spec.order,
            cutoff_hz = spec.cutoff_hz,
            upper_cutoff_hz = ?spec.upper_cutoff_hz,
            n = poly.b.len(),
            "designed butterworth coefficients"
        );
        FilterCoefficients::new(poly.b, poly.a)
    }
}

fn upper_cutoff(spec: &FilterSpec) -> Result<f64, ConfigError> {
    spec.upper_cutoff_hz.ok_or_else(|| ConfigError::InvalidParameter {
        name: "upper_cutoff_hz",
        reason: format!("required for {}", spec.pass_type),
    })
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Low,
    High,
}

/// Numerator/denominator polynomial pair in `z^-1`, `a[0] == 1`.
#[derive(Debug, Clone)]
struct Section {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl Section {
    fn unit() -> Self {
        Self { b: vec![1.0], a: vec![1.0] }
    }

    fn cascade(&self, other: &Section) -> Section {
        Section {
            b: poly_mul(&self.b, &other.b),
            a: poly_mul(&self.a, &other.a),
        }
    }
}

fn poly_mul(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, pi) in p.iter().enumerate() {
        for (j, qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}

/// Order-N Butterworth as a cascade of second-order sections with the
/// prototype's pole-pair Q factors, plus one first-order section for odd N.
fn butterworth(edge: Edge, fs: f64, cutoff: f64, order: usize) -> SignalResult<Section> {
    let mut poly = Section::unit();
    for k in 1..=order / 2 {
        let q = 1.0 / (2.0 * ((2 * k - 1) as f64 * PI / (2 * order) as f64).sin());
        poly = poly.cascade(&rbj(edge, fs, cutoff, q)?);
    }
    if order % 2 == 1 {
        poly = poly.cascade(&first_order(edge, fs, cutoff));
    }
    Ok(poly)
}

fn rbj(edge: Edge, fs: f64, f0: f64, q: f64) -> SignalResult<Section> {
    let filter_type = match edge {
        Edge::Low => Type::LowPass,
        Edge::High => Type::HighPass,
    };
    let c = Coefficients::<f64>::from_params(filter_type, fs.hz(), f0.hz(), q).map_err(|e| ConfigError::InvalidCutoff {
        hz: f0,
        reason: format!("{:?} section rejected: {:?}", edge, e),
    })?;
    Ok(Section {
        b: vec![c.b0, c.b1, c.b2],
        a: vec![1.0, c.a1, c.a2],
    })
}

/// Bilinear first-order section, prewarped to `cutoff`.
fn first_order(edge: Edge, fs: f64, cutoff: f64) -> Section {
    let k = (PI * cutoff / fs).tan();
    let a1 = (k - 1.0) / (k + 1.0);
    let b = match edge {
        Edge::Low => vec![k / (1.0 + k), k / (1.0 + k)],
        Edge::High => vec![1.0 / (1.0 + k), -1.0 / (1.0 + k)],
    };
    Section { b, a: vec![1.0, a1] }
}

/// Analog frequency (rad/s) that the bilinear transform maps onto `freq_hz`.
fn prewarp(freq_hz: f64, fs: f64) -> f64 {
    2.0 * fs * (PI * freq_hz / fs).tan()
}

/// Unit-cutoff analog Butterworth poles, all in the left half-plane.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    (0..order)
        .map(|k| Complex64::from_polar(1.0, PI * (2 * k + order + 1) as f64 / (2 * order) as f64))
        .collect()
}

/// Band Butterworth: the lowpass prototype moved onto the prewarped band
/// edges, then mapped to `z` by the bilinear transform.
fn band(pass_type: PassType, fs: f64, low: f64, high: f64, order: usize) -> Section {
    let (w1, w2) = (prewarp(low, fs), prewarp(high, fs));
    let bw = w2 - w1;
    let w0_sq = w1 * w2;

    // Each prototype pole p splits into the roots of s^2 - c s + w0^2
    let mut poles = Vec::with_capacity(2 * order);
    for p in prototype_poles(order) {
        let c = match pass_type {
            PassType::Bandstop => bw / p,
            _ => p * bw,
        };
        let disc = (c * c - 4.0 * w0_sq).sqrt();
        poles.push((c + disc) / 2.0);
        poles.push((c - disc) / 2.0);
    }

    let (zeros, gain): (Vec<Complex64>, f64) = match pass_type {
        PassType::Bandstop => {
            let w0 = w0_sq.sqrt();
            let notch = [Complex64::new(0.0, w0), Complex64::new(0.0, -w0)];
            (notch.iter().copied().cycle().take(2 * order).collect(), 1.0)
        }
        _ => (vec![Complex64::new(0.0, 0.0); order], bw.powi(order as i32)),
    };
    bilinear(&zeros, &poles, gain, fs)
}

/// Maps analog zeros, poles and gain to `z^-1` polynomials. Zeros at
/// infinity land on `z = -1`.
fn bilinear(zeros: &[Complex64], poles: &[Complex64], gain: f64, fs: f64) -> Section {
    let fs2 = 2.0 * fs;
    let map = |s: &Complex64| (fs2 + *s) / (fs2 - *s);

    let mut z_zeros: Vec<Complex64> = zeros.iter().map(map).collect();
    z_zeros.resize(poles.len(), Complex64::new(-1.0, 0.0));
    let z_poles: Vec<Complex64> = poles.iter().map(map).collect();

    let num: Complex64 = zeros.iter().map(|z| fs2 - *z).product();
    let den: Complex64 = poles.iter().map(|p| fs2 - *p).product();
    let k = gain * (num / den).re;

    Section {
        b: expand(&z_zeros).into_iter().map(|v| v * k).collect(),
        a: expand(&z_poles),
    }
}

/// Coefficients of `prod (1 - r z^-1)`. Roots come in conjugate pairs, so
/// only the real parts survive.
fn expand(roots: &[Complex64]) -> Vec<f64> {
    let mut poly = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        poly.push(Complex64::new(0.0, 0.0));
        for i in (1..poly.len()).rev() {
            let prev = poly[i - 1];
            poly[i] -= r * prev;
        }
    }
    poly.into_iter().map(|c| c.re).collect()
}
