//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::QualityCriterion;
use crate::error::Result;
use crate::sim::SimConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Observed mean times, or a sample file to derive them from.
    #[serde(default)]
    pub rates: RatesConfig,
    /// Steady-state analysis range.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Service-level criterion.
    #[serde(default)]
    pub criterion: CriterionConfig,
    /// Server availability for dimensioning.
    #[serde(default)]
    pub dimensioning: DimensioningConfig,
    /// Discrete-event simulation parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Observed mean times.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatesConfig {
    /// Mean time between consecutive arrivals (seconds).
    pub mean_interarrival: f64,
    /// Mean service time per customer (seconds).
    pub mean_service: f64,
    /// Optional CSV of customer samples; its column means replace the two
    /// values above.
    pub samples: Option<PathBuf>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            mean_interarrival: 1.0 / 0.035,
            mean_service: 1.0 / 0.0488,
            samples: None,
        }
    }
}

/// Steady-state analysis range.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Servers in the modeled chain.
    pub servers: u32,
    /// Number of states `0..states` in the truncated distribution.
    pub states: usize,
    /// State whose closed-form M/M/1 probability is reported.
    pub probe_state: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            servers: 1,
            states: 6,
            probe_state: 5,
        }
    }
}

/// Service-level criterion.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriterionConfig {
    /// Customers allowed to wait in line.
    pub queue_threshold: u32,
    /// Percentage of time the threshold must hold (0-100, exclusive).
    pub percentage: f64,
}

impl Default for CriterionConfig {
    fn default() -> Self {
        Self {
            queue_threshold: 5,
            percentage: 99.0,
        }
    }
}

/// Server availability for dimensioning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DimensioningConfig {
    /// Servers that can actually be deployed.
    pub available_servers: u32,
}

impl Default for DimensioningConfig {
    fn default() -> Self {
        Self {
            available_servers: 3,
        }
    }
}

/// Discrete-event simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of customers to simulate (must be > 0).
    pub customers: usize,
    /// Master random seed.
    pub seed: u64,
    /// Occupancy level whose time share is reported.
    pub occupancy_threshold: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            customers: 100,
            seed: 42,
            occupancy_threshold: 5,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"criterion.percentage"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: the observed office queue.
    pub fn baseline() -> Self {
        Self {
            rates: RatesConfig::default(),
            analysis: AnalysisConfig::default(),
            criterion: CriterionConfig::default(),
            dimensioning: DimensioningConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Returns the busy preset: a single server near saturation.
    pub fn busy() -> Self {
        Self {
            rates: RatesConfig {
                mean_interarrival: 22.0,
                mean_service: 20.0,
                samples: None,
            },
            analysis: AnalysisConfig {
                states: 40,
                probe_state: 10,
                ..AnalysisConfig::default()
            },
            simulation: SimulationConfig {
                customers: 500,
                occupancy_threshold: 8,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the strict preset: a tighter criterion with only two servers.
    pub fn strict() -> Self {
        Self {
            analysis: AnalysisConfig {
                servers: 2,
                ..AnalysisConfig::default()
            },
            criterion: CriterionConfig {
                queue_threshold: 2,
                percentage: 99.9,
            },
            dimensioning: DimensioningConfig {
                available_servers: 2,
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "busy", "strict"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> std::result::Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "busy" => Ok(Self::busy()),
            "strict" => Ok(Self::strict()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigError {
                field: field.into(),
                message,
            });
        };

        let r = &self.rates;
        if r.samples.is_none() {
            if !(r.mean_interarrival > 0.0 && r.mean_interarrival.is_finite()) {
                push("rates.mean_interarrival", "must be > 0".into());
            }
            if !(r.mean_service > 0.0 && r.mean_service.is_finite()) {
                push("rates.mean_service", "must be > 0".into());
            }
        }

        let a = &self.analysis;
        if a.servers == 0 {
            push("analysis.servers", "must be >= 1".into());
        }
        if a.states == 0 {
            push("analysis.states", "must be > 0".into());
        }

        let c = &self.criterion;
        if !(c.percentage > 0.0 && c.percentage < 100.0) {
            push(
                "criterion.percentage",
                format!("must be in (0, 100), got {}", c.percentage),
            );
        }

        if self.dimensioning.available_servers == 0 {
            push("dimensioning.available_servers", "must be >= 1".into());
        }

        if self.simulation.customers == 0 {
            push("simulation.customers", "must be > 0".into());
        }

        errors
    }

    /// Builds the validated criterion.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the percentage is out of range.
    pub fn quality_criterion(&self) -> Result<QualityCriterion> {
        QualityCriterion::new(self.criterion.queue_threshold, self.criterion.percentage)
    }

    /// Builds the simulation run configuration.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the customer count is zero.
    pub fn sim_config(&self) -> Result<SimConfig> {
        SimConfig::new(self.simulation.customers, self.simulation.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_rates_match_observed_office() {
        let cfg = ScenarioConfig::baseline();
        approx::assert_relative_eq!(
            1.0 / cfg.rates.mean_interarrival,
            0.035,
            max_relative = 1e-12
        );
        approx::assert_relative_eq!(1.0 / cfg.rates.mean_service, 0.0488, max_relative = 1e-12);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[rates]
mean_interarrival = 30.0
mean_service = 12.5
samples = "clientes.csv"

[analysis]
servers = 2
states = 12
probe_state = 3

[criterion]
queue_threshold = 4
percentage = 95.0

[dimensioning]
available_servers = 4

[simulation]
customers = 250
seed = 7
occupancy_threshold = 3
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.analysis.states), Some(12));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.customers), Some(250));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.rates.samples.clone()),
            Some(PathBuf::from("clientes.csv"))
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[criterion]
percentage = 99.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        // customers kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.customers), Some(100));
        assert_eq!(cfg.as_ref().map(|c| c.criterion.queue_threshold), Some(5));
    }

    #[test]
    fn validation_catches_bad_percentage() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.criterion.percentage = 100.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "criterion.percentage"));
        assert!(cfg.quality_criterion().is_err());
    }

    #[test]
    fn validation_catches_zero_counts() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.analysis.servers = 0;
        cfg.simulation.customers = 0;
        cfg.dimensioning.available_servers = 0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"analysis.servers".to_string()));
        assert!(fields.contains(&"simulation.customers".to_string()));
        assert!(fields.contains(&"dimensioning.available_servers".to_string()));
    }

    #[test]
    fn samples_make_means_optional() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.rates.mean_service = 0.0;
        assert!(cfg.validate().iter().any(|e| e.field == "rates.mean_service"));
        cfg.rates.samples = Some(PathBuf::from("clientes.csv"));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn strict_is_tighter_than_baseline() {
        let base = ScenarioConfig::baseline();
        let strict = ScenarioConfig::strict();
        assert!(strict.criterion.percentage > base.criterion.percentage);
        assert!(strict.dimensioning.available_servers < base.dimensioning.available_servers);
    }
}
