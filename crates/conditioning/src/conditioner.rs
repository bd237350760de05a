//! Per-tick conditioning cycle for one channel group.
//!
//! Each incoming sample goes through
//! raw buffer -> filter -> filtered buffer, and once more than `step`
//! samples have arrived since the last analysis the newest `window_len`
//! samples of both buffers are handed out in channel-major layout.

use eeg_types::{ConditionerConfig, ConfigError, FilterMode};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SignalResult;
use crate::filter::{ButterworthDesigner, CoefficientProvider, HistoryFilter, StreamingFilter};
use crate::ring_buffer::RingBuffer;

/// Windows handed to downstream analysis, both `[channels, window_len]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisWindows {
    pub raw: Array2<f64>,
    pub filtered: Array2<f64>,
}

enum Engine {
    Recursive(StreamingFilter),
    History {
        filter: HistoryFilter,
        // Reused every tick
        x: Array2<f64>,
        y: Array2<f64>,
    },
}

pub struct Conditioner {
    config: ConditionerConfig,
    raw: RingBuffer,
    filtered: RingBuffer,
    engine: Engine,
    scratch: Vec<f64>,
    triggers: u64,
}

impl Conditioner {
    /// Builds a conditioner with Butterworth coefficients.
    pub fn new(config: ConditionerConfig) -> SignalResult<Self> {
        Self::with_provider(config, &ButterworthDesigner)
    }

    /// Builds a conditioner with coefficients from `provider`. All
    /// configuration errors surface here, never from [`push`](Self::push).
    pub fn with_provider(config: ConditionerConfig, provider: &dyn CoefficientProvider) -> SignalResult<Self> {
        config.validate()?;
        let coeffs = provider.design(config.sample_rate_hz, &config.filter)?;

        let engine = match config.mode {
            FilterMode::Recursive => Engine::Recursive(StreamingFilter::new(coeffs, config.channels)?),
            FilterMode::History => {
                let needed = coeffs.nb().max(coeffs.na() - 1);
                if config.buffer_len < needed {
                    return Err(ConfigError::InvalidParameter {
                        name: "buffer_len",
                        reason: format!("history filtering needs at least {} samples of history", needed),
                    }
                    .into());
                }
                Engine::History {
                    filter: HistoryFilter::new(coeffs, config.backend),
                    x: Array2::zeros((0, 0)),
                    y: Array2::zeros((0, 0)),
                }
            }
        };

        info!(
            sample_rate_hz = config.sample_rate_hz,
            channels = config.channels,
            buffer_len = config.buffer_len,
            window_len = config.window_len,
            step = config.step,
            mode = ?config.mode,
            filter = %config.filter.pass_type,
            "conditioner ready"
        );

        Ok(Self {
            raw: RingBuffer::new(config.buffer_len, config.channels)?,
            filtered: RingBuffer::new(config.buffer_len, config.channels)?,
            scratch: vec![0.0; config.channels],
            triggers: 0,
            engine,
            config,
        })
    }

    pub fn config(&self) -> &ConditionerConfig {
        &self.config
    }

    pub fn raw_buffer(&self) -> &RingBuffer {
        &self.raw
    }

    pub fn filtered_buffer(&self) -> &RingBuffer {
        &self.filtered
    }

    /// Filter output for the most recent sample.
    pub fn latest_filtered(&self) -> &[f64] {
        self.filtered.latest()
    }

    /// How many times analysis windows have been handed out.
    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Runs one full tick for `sample`.
    ///
    /// Returns analysis windows when the trigger fires. A sample of the
    /// wrong width is rejected before anything is touched.
    pub fn push(&mut self, sample: &[f64]) -> SignalResult<Option<AnalysisWindows>> {
        self.raw.update(sample)?;

        match &mut self.engine {
            Engine::Recursive(filter) => filter.transform(sample, &mut self.scratch)?,
            Engine::History { filter, x, y } => {
                let (nb, ny) = filter.required_history();
                self.raw.extract_into(nb, x)?;
                self.filtered.extract_into(ny, y)?;
                filter.transform(x, y, &mut self.scratch)?;
            }
        }
        self.filtered.update(&self.scratch)?;

        if self.raw.pts() <= self.config.step {
            return Ok(None);
        }
        self.raw.reset_pts();
        self.triggers += 1;

        let windows = AnalysisWindows {
            raw: self.raw.extract_transposed(self.config.window_len)?,
            filtered: self.filtered.extract_transposed(self.config.window_len)?,
        };
        debug!(trigger = self.triggers, "analysis windows ready");
        Ok(Some(windows))
    }
}
