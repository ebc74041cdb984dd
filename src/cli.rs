//! Command-line arguments and scenario selection.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ScenarioConfig};

#[derive(Parser, Debug)]
#[command(
    name = "queue-sim",
    version,
    about = "Birth-death queue analysis, dimensioning and simulation",
    after_help = "If neither --scenario nor --preset is given, the baseline preset is used."
)]
pub struct Cli {
    /// Load the scenario from a TOML file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, busy, strict).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Derive the mean times from a customer CSV instead of the scenario.
    #[arg(long, value_name = "PATH")]
    pub samples: Option<PathBuf>,

    /// Override the simulation seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of simulated customers.
    #[arg(long)]
    pub customers: Option<usize>,

    /// Write the per-customer trace as CSV.
    #[arg(long, value_name = "PATH")]
    pub trace_out: Option<PathBuf>,

    /// Write the occupancy step function as CSV.
    #[arg(long, value_name = "PATH")]
    pub occupancy_out: Option<PathBuf>,

    /// Write the full report as JSON.
    #[arg(long, value_name = "PATH")]
    pub summary_out: Option<PathBuf>,

    /// Log level for this crate when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Loads the selected scenario and applies the command-line overrides.
    ///
    /// `--scenario` wins over `--preset`; with neither, the baseline is used.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be parsed or the preset
    /// is unknown.
    pub fn load_scenario(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut scenario = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
            (None, Some(name)) => ScenarioConfig::from_preset(name)?,
            (None, None) => ScenarioConfig::baseline(),
        };

        if let Some(path) = &self.samples {
            scenario.rates.samples = Some(path.clone());
        }
        if let Some(seed) = self.seed {
            scenario.simulation.seed = seed;
        }
        if let Some(customers) = self.customers {
            scenario.simulation.customers = customers;
        }
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn defaults_to_baseline() {
        let cli = Cli::try_parse_from(["queue-sim"]).expect("parse should succeed");
        assert!(cli.scenario.is_none());
        assert!(cli.preset.is_none());
        assert_eq!(cli.log_level, "info");
        let cfg = cli.load_scenario().expect("baseline loads");
        assert_eq!(cfg.analysis.states, 6);
    }

    #[test]
    fn preset_with_overrides() {
        let cli = Cli::try_parse_from([
            "queue-sim",
            "--preset",
            "busy",
            "--seed",
            "9",
            "--customers",
            "20",
        ])
        .expect("parse should succeed");
        let cfg = cli.load_scenario().expect("preset loads");
        assert_eq!(cfg.simulation.seed, 9);
        assert_eq!(cfg.simulation.customers, 20);
        assert_eq!(cfg.analysis.states, 40);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "queue-sim",
            "--scenario",
            "a.toml",
            "--preset",
            "baseline",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_preset_is_reported() {
        let cli = Cli::try_parse_from(["queue-sim", "--preset", "nope"]).expect("parses");
        assert!(cli.load_scenario().is_err());
    }

    #[test]
    fn samples_override_sets_path() {
        let cli =
            Cli::try_parse_from(["queue-sim", "--samples", "clientes.csv"]).expect("parses");
        let cfg = cli.load_scenario().expect("baseline loads");
        assert_eq!(
            cfg.rates.samples.as_deref().and_then(|p| p.to_str()),
            Some("clientes.csv")
        );
    }

    #[test]
    fn non_numeric_seed_rejected() {
        assert!(Cli::try_parse_from(["queue-sim", "--seed", "abc"]).is_err());
    }
}
