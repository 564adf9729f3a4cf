//! TOML-based persisted defaults for the CLI and API.
//!
//! The core never reads configuration itself: `main.rs` (or the API
//! bootstrap) loads and validates an [`AppConfig`], then hands the core
//! plain [`OptimizationWeights`](crate::model::OptimizationWeights) and
//! [`Workload`](crate::model::Workload) values built from it.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::grid::profile::Region;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`AppConfig::from_toml_file`] or use [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Optimization weight and delay defaults.
    pub optimization: OptimizationConfig,
    /// Default workload parameters.
    pub defaults: WorkloadDefaults,
}

/// Optimization algorithm defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizationConfig {
    /// Weight for cost optimization (0.0 to 1.0).
    pub price_weight: f32,
    /// Weight for carbon optimization (0.0 to 1.0).
    pub carbon_weight: f32,
    /// Minimum delay before starting workloads (hours, >= 0).
    pub min_delay_hours: f32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            price_weight: 0.7,
            carbon_weight: 0.3,
            min_delay_hours: 0.0,
        }
    }
}

/// Default workload parameters used when CLI flags are omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadDefaults {
    /// Default workload duration (hours).
    pub duration_hours: f32,
    /// Default power draw (kW).
    pub power_draw_kw: f32,
    /// Default deadline (hours).
    pub deadline_hours: f32,
    /// Default grid region identifier.
    pub region: String,
}

impl Default for WorkloadDefaults {
    fn default() -> Self {
        Self {
            duration_hours: 4.0,
            power_draw_kw: 50.0,
            deadline_hours: 12.0,
            region: "US-WEST".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"optimization.price_weight"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl AppConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let o = &self.optimization;

        if !(0.0..=1.0).contains(&o.price_weight) {
            errors.push(ConfigError {
                field: "optimization.price_weight".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if !(0.0..=1.0).contains(&o.carbon_weight) {
            errors.push(ConfigError {
                field: "optimization.carbon_weight".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if (o.price_weight + o.carbon_weight - 1.0).abs() > 0.01 {
            errors.push(ConfigError {
                field: "optimization".into(),
                message: "price_weight and carbon_weight must sum to 1.0".into(),
            });
        }
        if o.min_delay_hours < 0.0 {
            errors.push(ConfigError {
                field: "optimization.min_delay_hours".into(),
                message: "must be >= 0".into(),
            });
        }

        let d = &self.defaults;
        if d.duration_hours <= 0.0 {
            errors.push(ConfigError {
                field: "defaults.duration_hours".into(),
                message: "must be > 0".into(),
            });
        }
        if d.power_draw_kw <= 0.0 {
            errors.push(ConfigError {
                field: "defaults.power_draw_kw".into(),
                message: "must be > 0".into(),
            });
        }
        if d.deadline_hours <= 0.0 {
            errors.push(ConfigError {
                field: "defaults.deadline_hours".into(),
                message: "must be > 0".into(),
            });
        } else if d.deadline_hours < d.duration_hours {
            errors.push(ConfigError {
                field: "defaults.deadline_hours".into(),
                message: "must be >= defaults.duration_hours".into(),
            });
        }
        if Region::parse(&d.region).is_err() {
            errors.push(ConfigError {
                field: "defaults.region".into(),
                message: format!("unknown region \"{}\"", d.region),
            });
        }

        errors
    }
}
