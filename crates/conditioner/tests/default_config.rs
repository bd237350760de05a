use conditioner::config::load_config;
use conditioner::runner;
use eeg_conditioning::synth::synthetic_signal;
use eeg_types::ConditionerConfig;
use std::path::Path;

fn default_config_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml")
}

#[test]
fn test_shipped_config_matches_builtin_default() {
    let config = load_config(&default_config_path()).expect("Failed to load shipped config");
    assert_eq!(config, ConditionerConfig::default());
}

#[test]
fn test_shipped_config_forms_agree() {
    let config = load_config(&default_config_path()).unwrap();
    let signal = synthetic_signal(10.0, config.channels, config.sample_rate_hz);

    let comparison = runner::compare(&config, &signal, 1e-6).expect("filter forms should agree");
    // 2200 samples, a trigger every 23
    for run in &comparison.runs {
        assert_eq!(run.triggers, 2200 / 23);
    }
}
