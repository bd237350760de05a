use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conditioner::config::load_config;
use conditioner::runner::{self, RunSummary};
use eeg_conditioning::synth::{add_noise, synthetic_signal};
use eeg_conditioning::{ButterworthDesigner, CoefficientProvider};
use eeg_types::{ConditionerConfig, FilterSpec, PassType};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "eeg_conditioner", about = "Streams a synthetic EEG signal through the conditioning core")]
struct Cli {
    /// Configuration file (.toml or .json); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the filter class (lowpass, highpass, bandpass, bandstop)
    #[arg(long, global = true)]
    pass_type: Option<PassType>,

    #[arg(long, global = true)]
    order: Option<usize>,

    /// Override the cutoff, or the lower edge for band filters
    #[arg(long, global = true)]
    cutoff: Option<f64>,

    /// Override the upper band edge
    #[arg(long, global = true)]
    upper_cutoff: Option<f64>,

    #[arg(long, global = true)]
    channels: Option<usize>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured conditioner and report analysis triggers
    Run {
        #[command(flatten)]
        signal: SignalArgs,
    },
    /// Run every filter form on the same signal, check agreement and time them
    Compare {
        #[command(flatten)]
        signal: SignalArgs,
        /// Largest allowed difference between the forms
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,
    },
    /// Print the designed filter coefficients
    Design,
}

#[derive(clap::Args, Debug)]
struct SignalArgs {
    /// Signal length in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,
    /// Uniform noise amplitude added on top of the test tones
    #[arg(long, default_value_t = 0.0)]
    noise: f64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl SignalArgs {
    fn generate(&self, config: &ConditionerConfig) -> Vec<Vec<f64>> {
        let mut signal = synthetic_signal(self.seconds, config.channels, config.sample_rate_hz);
        add_noise(&mut signal, self.noise, self.seed);
        signal
    }
}

impl Cli {
    fn resolve_config(&self) -> Result<ConditionerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ConditionerConfig::default(),
        };

        let filter = &mut config.filter;
        if let Some(pass_type) = self.pass_type {
            filter.pass_type = pass_type;
        }
        if let Some(order) = self.order {
            filter.order = order;
        }
        if let Some(cutoff) = self.cutoff {
            filter.cutoff_hz = cutoff;
        }
        if self.upper_cutoff.is_some() {
            filter.upper_cutoff_hz = self.upper_cutoff;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }

        config.validate().context("invalid conditioner configuration")?;
        Ok(config)
    }
}

fn describe(filter: &FilterSpec) -> String {
    match filter.upper_cutoff_hz {
        Some(hi) if filter.pass_type.is_band() => {
            format!("{} order {} {}-{} Hz", filter.pass_type, filter.order, filter.cutoff_hz, hi)
        }
        _ => format!("{} order {} {} Hz", filter.pass_type, filter.order, filter.cutoff_hz),
    }
}

fn print_run(summary: &RunSummary) {
    println!(
        "{:<16} {:>8} samples {:>6} triggers {:>9.3} us/sample",
        summary.label(),
        summary.samples,
        summary.triggers,
        summary.micros_per_sample()
    );
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conditioner=info,eeg_conditioning=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    tracing::info!("Conditioning with {} at {} Hz", describe(&config.filter), config.sample_rate_hz);

    match &cli.command {
        Command::Run { signal } => {
            let summary = runner::run(&config, &signal.generate(&config))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_run(&summary);
                let rms: Vec<String> = summary.filtered_rms.iter().map(|r| format!("{:.3}", r)).collect();
                println!("filtered window RMS per channel: [{}]", rms.join(", "));
            }
        }
        Command::Compare { signal, tolerance } => {
            let comparison = runner::compare(&config, &signal.generate(&config), *tolerance)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                for summary in &comparison.runs {
                    print_run(summary);
                }
                println!("max |recursive - history| = {:e}", comparison.max_abs_diff);
            }
        }
        Command::Design => {
            let coeffs = ButterworthDesigner.design(config.sample_rate_hz, &config.filter)?;
            if cli.json {
                println!("{}", serde_json::json!({ "b": coeffs.b(), "a": coeffs.a() }));
            } else {
                println!("b = {:?}", coeffs.b());
                println!("a = {:?}", coeffs.a());
            }
        }
    }

    Ok(())
}
