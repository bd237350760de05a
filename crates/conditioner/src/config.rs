use anyhow::{bail, Context, Result};
use eeg_types::ConditionerConfig;
use std::path::Path;

/// Loads a conditioner configuration from a `.toml` or `.json` file and
/// validates it.
pub fn load_config(path: &Path) -> Result<ConditionerConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("could not read configuration file '{}'", path.display()))?;

    let config: ConditionerConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("could not parse TOML configuration '{}'", path.display()))?,
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("could not parse JSON configuration '{}'", path.display()))?,
        other => bail!(
            "unsupported configuration format {:?} for '{}' (expected .toml or .json)",
            other.unwrap_or(""),
            path.display()
        ),
    };

    config
        .validate()
        .with_context(|| format!("invalid configuration in '{}'", path.display()))?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}
