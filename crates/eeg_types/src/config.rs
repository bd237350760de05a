//! Configuration types for the signal-conditioning core

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Highest filter order accepted by [`FilterSpec::validate`].
pub const MAX_FILTER_ORDER: usize = 12;

/// Filter class requested from a coefficient provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl PassType {
    /// True for the classes that need two cutoff frequencies.
    pub fn is_band(self) -> bool {
        matches!(self, PassType::Bandpass | PassType::Bandstop)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PassType::Lowpass => "lowpass",
            PassType::Highpass => "highpass",
            PassType::Bandpass => "bandpass",
            PassType::Bandstop => "bandstop",
        }
    }
}

impl fmt::Display for PassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Ok(PassType::Lowpass),
            "highpass" => Ok(PassType::Highpass),
            "bandpass" => Ok(PassType::Bandpass),
            "bandstop" => Ok(PassType::Bandstop),
            _ => Err(ConfigError::UnknownPassType(s.to_string())),
        }
    }
}

/// Everything a coefficient provider needs besides the sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Filter class
    pub pass_type: PassType,
    /// Prototype order
    pub order: usize,
    /// Cutoff in Hz (lower band edge for band classes)
    pub cutoff_hz: f64,
    /// Upper band edge in Hz, band classes only
    #[serde(default)]
    pub upper_cutoff_hz: Option<f64>,
}

impl FilterSpec {
    pub fn lowpass(order: usize, cutoff_hz: f64) -> Self {
        Self { pass_type: PassType::Lowpass, order, cutoff_hz, upper_cutoff_hz: None }
    }

    pub fn highpass(order: usize, cutoff_hz: f64) -> Self {
        Self { pass_type: PassType::Highpass, order, cutoff_hz, upper_cutoff_hz: None }
    }

    pub fn bandpass(order: usize, low_hz: f64, high_hz: f64) -> Self {
        Self { pass_type: PassType::Bandpass, order, cutoff_hz: low_hz, upper_cutoff_hz: Some(high_hz) }
    }

    pub fn bandstop(order: usize, low_hz: f64, high_hz: f64) -> Self {
        Self { pass_type: PassType::Bandstop, order, cutoff_hz: low_hz, upper_cutoff_hz: Some(high_hz) }
    }

    /// Checks order and cutoffs against the sampling rate.
    ///
    /// Cutoffs must lie strictly between 0 Hz and Nyquist; band classes
    /// additionally need `cutoff_hz < upper_cutoff_hz`.
    pub fn validate(&self, sample_rate_hz: f64) -> Result<(), ConfigError> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(ConfigError::InvalidSampleRate(sample_rate_hz));
        }
        if self.order == 0 || self.order > MAX_FILTER_ORDER {
            return Err(ConfigError::InvalidOrder { order: self.order, max: MAX_FILTER_ORDER });
        }

        let nyquist = sample_rate_hz * 0.5;
        check_cutoff(self.cutoff_hz, nyquist)?;

        if self.pass_type.is_band() {
            let upper = self.upper_cutoff_hz.ok_or_else(|| ConfigError::InvalidParameter {
                name: "upper_cutoff_hz",
                reason: format!("required for {}", self.pass_type),
            })?;
            check_cutoff(upper, nyquist)?;
            if upper <= self.cutoff_hz {
                return Err(ConfigError::InvalidCutoff {
                    hz: upper,
                    reason: format!("upper cutoff must exceed lower cutoff {} Hz", self.cutoff_hz),
                });
            }
        }
        Ok(())
    }
}

fn check_cutoff(hz: f64, nyquist: f64) -> Result<(), ConfigError> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(ConfigError::InvalidCutoff { hz, reason: "must be positive".into() });
    }
    if hz >= nyquist {
        return Err(ConfigError::InvalidCutoff { hz, reason: format!("must be below Nyquist ({} Hz)", nyquist) });
    }
    Ok(())
}

/// Which of the two equivalent filter algorithms drives the conditioner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Direct Form II Transposed with carried per-channel state
    #[default]
    Recursive,
    /// Difference equation replayed over ring buffer history
    History,
}

/// Numeric backend for the explicit-history filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// Plain slice loops
    #[default]
    Plain,
    /// Dense matrix products
    Matrix,
}

/// Configuration for one channel group's conditioning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionerConfig {
    /// Sampling frequency in Hz
    pub sample_rate_hz: f64,
    /// Number of channels per sample
    pub channels: usize,
    /// Ring buffer capacity in samples
    pub buffer_len: usize,
    /// Length of the windows handed to analysis, in samples
    pub window_len: usize,
    /// Analysis runs once more than `step` samples arrived since the last run
    pub step: usize,
    /// Filter to design
    pub filter: FilterSpec,
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default)]
    pub backend: HistoryBackend,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 220.0,
            channels: 4,
            buffer_len: 220,
            window_len: 220,
            step: 22,
            filter: FilterSpec::bandpass(5, 2.0, 36.0),
            mode: FilterMode::default(),
            backend: HistoryBackend::default(),
        }
    }
}

impl ConditionerConfig {
    /// One-second buffer and window, analysis every tenth of a second.
    pub fn for_sample_rate(sample_rate_hz: f64, channels: usize, filter: FilterSpec) -> Self {
        let samples = sample_rate_hz.round().max(1.0) as usize;
        Self {
            sample_rate_hz,
            channels,
            buffer_len: samples,
            window_len: samples,
            step: samples / 10,
            filter,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels == 0 {
            return Err(ConfigError::InvalidParameter { name: "channels", reason: "must be at least 1".into() });
        }
        if self.buffer_len == 0 {
            return Err(ConfigError::InvalidParameter { name: "buffer_len", reason: "must be at least 1".into() });
        }
        if self.window_len == 0 || self.window_len > self.buffer_len {
            return Err(ConfigError::InvalidParameter {
                name: "window_len",
                reason: format!("must be between 1 and buffer_len ({})", self.buffer_len),
            });
        }
        self.filter.validate(self.sample_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_type_parsing() {
        assert_eq!("lowpass".parse::<PassType>().unwrap(), PassType::Lowpass);
        assert_eq!(" BandStop ".parse::<PassType>().unwrap(), PassType::Bandstop);
        assert_eq!(
            "notch".parse::<PassType>(),
            Err(ConfigError::UnknownPassType("notch".into()))
        );
        // No substring matching: "bandpass2" is not a bandpass.
        assert!("bandpass2".parse::<PassType>().is_err());
    }

    #[test]
    fn test_filter_spec_validation() {
        assert!(FilterSpec::lowpass(4, 40.0).validate(250.0).is_ok());
        assert!(matches!(
            FilterSpec::lowpass(0, 40.0).validate(250.0),
            Err(ConfigError::InvalidOrder { .. })
        ));
        assert!(matches!(
            FilterSpec::lowpass(13, 40.0).validate(250.0),
            Err(ConfigError::InvalidOrder { .. })
        ));
        assert!(matches!(
            FilterSpec::highpass(2, 125.0).validate(250.0),
            Err(ConfigError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            FilterSpec::bandpass(2, 30.0, 10.0).validate(250.0),
            Err(ConfigError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            FilterSpec::lowpass(2, 10.0).validate(0.0),
            Err(ConfigError::InvalidSampleRate(_))
        ));

        let mut missing_upper = FilterSpec::bandstop(2, 55.0, 65.0);
        missing_upper.upper_cutoff_hz = None;
        assert!(matches!(
            missing_upper.validate(256.0),
            Err(ConfigError::InvalidParameter { name: "upper_cutoff_hz", .. })
        ));
    }

    #[test]
    fn test_conditioner_config_defaults_from_json() {
        let json = r#"
        {
            "sample_rate_hz": 250.0,
            "channels": 8,
            "buffer_len": 250,
            "window_len": 250,
            "step": 25,
            "filter": { "pass_type": "highpass", "order": 2, "cutoff_hz": 1.0 }
        }
        "#;
        let cfg: ConditionerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.mode, FilterMode::Recursive);
        assert_eq!(cfg.backend, HistoryBackend::Plain);
        assert_eq!(cfg.filter.upper_cutoff_hz, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_conditioner_config_rejects_oversized_window() {
        let mut cfg = ConditionerConfig::default();
        cfg.window_len = cfg.buffer_len + 1;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidParameter { name: "window_len", .. })));
    }

    #[test]
    fn test_for_sample_rate() {
        let cfg = ConditionerConfig::for_sample_rate(256.0, 2, FilterSpec::lowpass(4, 30.0));
        assert_eq!(cfg.buffer_len, 256);
        assert_eq!(cfg.window_len, 256);
        assert_eq!(cfg.step, 25);
        assert!(cfg.validate().is_ok());
    }
}
