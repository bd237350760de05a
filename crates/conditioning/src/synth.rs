//! Synthetic multichannel test signals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// One sinusoidal component of a synthetic signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub amplitude: f64,
    pub frequency_hz: f64,
}

/// Slow drift, a beta-band rhythm and powerline hum.
pub const DEFAULT_TONES: [Tone; 3] = [
    Tone { amplitude: 10.0, frequency_hz: 1.0 },
    Tone { amplitude: 5.0, frequency_hz: 20.0 },
    Tone { amplitude: 1.0, frequency_hz: 60.0 },
];

/// Generates `duration_s` seconds of [`DEFAULT_TONES`], identical on every
/// channel. Returned as one `Vec` per sample.
pub fn synthetic_signal(duration_s: f64, channels: usize, sample_rate_hz: f64) -> Vec<Vec<f64>> {
    tones_signal(&DEFAULT_TONES, duration_s, channels, sample_rate_hz)
}

pub fn tones_signal(tones: &[Tone], duration_s: f64, channels: usize, sample_rate_hz: f64) -> Vec<Vec<f64>> {
    let n = (duration_s * sample_rate_hz) as usize;
    let dt = 1.0 / sample_rate_hz;
    (0..n)
        .map(|i| {
            let t = i as f64 * dt;
            let v: f64 = tones
                .iter()
                .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
                .sum();
            vec![v; channels]
        })
        .collect()
}

/// Adds independent uniform noise in `[-amplitude, amplitude)` to every
/// value. Seeded so runs are reproducible.
pub fn add_noise(signal: &mut [Vec<f64>], amplitude: f64, seed: u64) {
    if amplitude <= 0.0 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for sample in signal.iter_mut() {
        for v in sample.iter_mut() {
            *v += rng.gen_range(-amplitude..amplitude);
        }
    }
}
