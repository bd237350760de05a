//! Drives a conditioner over a prepared signal and summarises the run.

use anyhow::{ensure, Result};
use eeg_conditioning::Conditioner;
use eeg_types::{ConditionerConfig, FilterMode, HistoryBackend};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Outcome of streaming one signal through one conditioner.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: FilterMode,
    pub backend: HistoryBackend,
    pub samples: usize,
    pub triggers: u64,
    /// Per-channel RMS of the last filtered analysis window
    pub filtered_rms: Vec<f64>,
    pub elapsed: Duration,
    #[serde(skip)]
    pub filtered: Vec<Vec<f64>>,
}

impl RunSummary {
    pub fn label(&self) -> String {
        match self.mode {
            FilterMode::Recursive => "recursive".to_string(),
            FilterMode::History => format!("history/{:?}", self.backend).to_lowercase(),
        }
    }

    pub fn micros_per_sample(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1e6 / self.samples as f64
    }
}

/// Streams `signal` through a fresh conditioner built from `config`.
pub fn run(config: &ConditionerConfig, signal: &[Vec<f64>]) -> Result<RunSummary> {
    let mut conditioner = Conditioner::new(config.clone())?;
    let mut filtered = Vec::with_capacity(signal.len());
    let mut filtered_rms = vec![0.0; config.channels];

    let start = Instant::now();
    for sample in signal {
        if let Some(windows) = conditioner.push(sample)? {
            for (rms, row) in filtered_rms.iter_mut().zip(windows.filtered.rows()) {
                *rms = (row.iter().map(|v| v * v).sum::<f64>() / row.len() as f64).sqrt();
            }
        }
        filtered.push(conditioner.latest_filtered().to_vec());
    }
    let elapsed = start.elapsed();

    tracing::debug!(samples = signal.len(), triggers = conditioner.triggers(), ?elapsed, "run finished");
    Ok(RunSummary {
        mode: config.mode,
        backend: config.backend,
        samples: signal.len(),
        triggers: conditioner.triggers(),
        filtered_rms,
        elapsed,
        filtered,
    })
}

/// The recursive run plus every history backend, checked against each other.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub runs: Vec<RunSummary>,
    /// Largest absolute difference between the recursive output and any
    /// history backend's output
    pub max_abs_diff: f64,
}

/// Runs `signal` through the recursive form and both history backends.
/// Fails when any history output strays from the recursive one by more
/// than `tolerance`.
pub fn compare(config: &ConditionerConfig, signal: &[Vec<f64>], tolerance: f64) -> Result<Comparison> {
    let variants = [
        (FilterMode::Recursive, HistoryBackend::Plain),
        (FilterMode::History, HistoryBackend::Plain),
        (FilterMode::History, HistoryBackend::Matrix),
    ];

    let mut runs = Vec::with_capacity(variants.len());
    for (mode, backend) in variants {
        let variant = ConditionerConfig { mode, backend, ..config.clone() };
        runs.push(run(&variant, signal)?);
    }

    let reference = &runs[0].filtered;
    let max_abs_diff = runs[1..]
        .iter()
        .flat_map(|r| r.filtered.iter().zip(reference))
        .flat_map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()))
        .fold(0.0, f64::max);

    ensure!(
        max_abs_diff <= tolerance,
        "filter forms disagree: max difference {:e} exceeds tolerance {:e}",
        max_abs_diff,
        tolerance
    );
    Ok(Comparison { runs, max_abs_diff })
}
