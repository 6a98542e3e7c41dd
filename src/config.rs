//! TOML-based dashboard configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aggregate::{BudgetThresholds, LOAD_ADJUSTMENT_LIMIT_PCT, Scenario};
use crate::appliance::ApplianceSet;
use crate::dashboard::MAX_WINDOW_HOURS;
use crate::error::WattcastError;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`AppConfig::from_toml_file`] or use [`AppConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Forecast request defaults.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Budget thresholds and alert endpoint.
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// What-if overlay.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// Forecast request defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Sample dataset JSON path; synthesize everything when unset.
    pub dataset_path: Option<PathBuf>,
    /// Forward window in hours (1, 4, 8 or 24 have sample data).
    pub forecast_hours: i64,
    /// Lookback window in hours.
    pub lookback_hours: i64,
    /// Currency per kWh; the dataset default or 13.47 when unset.
    pub tariff: Option<f64>,
    /// Spending ceiling for the forward window; the dataset default or 300 when unset.
    pub budget: Option<f64>,
    /// Appliance set: `"standard"` or `"extended"`.
    pub appliances: String,
    /// Seed for synthetic values; fresh entropy when unset.
    pub seed: Option<u64>,
    /// Settings JSON path used in place of browser storage.
    pub settings_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            forecast_hours: 1,
            lookback_hours: 1,
            tariff: None,
            budget: None,
            appliances: "standard".to_string(),
            seed: None,
            settings_path: None,
        }
    }
}

/// Budget thresholds and alert endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertsConfig {
    /// Base URL of the alert endpoint; emails are disabled when unset.
    pub endpoint: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum hours between emails of the same severity.
    pub cooldown_hours: i64,
    /// Warning threshold in percent of budget.
    pub threshold_approaching: f64,
    /// Critical threshold in percent of budget.
    pub threshold_critical: f64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        let thresholds = BudgetThresholds::default();
        Self {
            endpoint: None,
            timeout_secs: 10,
            cooldown_hours: 4,
            threshold_approaching: thresholds.approaching,
            threshold_critical: thresholds.critical,
        }
    }
}

/// What-if overlay parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub enabled: bool,
    /// Replacement tariff for forward costs.
    pub tariff: Option<f64>,
    /// Percent change of forward load, within ±50.
    pub load_adjustment_pct: f64,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"dashboard.tariff"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl AppConfig {
    /// Default configuration.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// 24-hour outlook with scenario mode on: 10% less load at a higher tariff.
    pub fn what_if() -> Self {
        Self {
            dashboard: DashboardConfig {
                forecast_hours: 24,
                lookback_hours: 24,
                ..DashboardConfig::default()
            },
            alerts: AlertsConfig::default(),
            scenario: ScenarioConfig {
                enabled: true,
                tariff: Some(15.0),
                load_adjustment_pct: -10.0,
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "scenario"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::baseline()),
            "scenario" => Ok(Self::what_if()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e))
    }

    /// Budget thresholds from the alerts section.
    pub fn thresholds(&self) -> BudgetThresholds {
        BudgetThresholds {
            approaching: self.alerts.threshold_approaching,
            critical: self.alerts.threshold_critical,
        }
    }

    /// Scenario overlay when enabled.
    pub fn scenario(&self) -> Option<Scenario> {
        self.scenario
            .enabled
            .then(|| Scenario::new(self.scenario.tariff, self.scenario.load_adjustment_pct))
    }

    /// Resolved appliance set, standard when the name is unknown.
    pub fn appliance_set(&self) -> ApplianceSet {
        ApplianceSet::by_name(&self.dashboard.appliances).unwrap_or_default()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let d = &self.dashboard;

        for (field, hours) in [
            ("dashboard.forecast_hours", d.forecast_hours),
            ("dashboard.lookback_hours", d.lookback_hours),
        ] {
            if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
                errors.push(ConfigError::new(
                    field,
                    format!("must be within 1..={MAX_WINDOW_HOURS}, got {hours}"),
                ));
            }
        }
        if d.tariff.is_some_and(|t| !t.is_finite() || t <= 0.0) {
            errors.push(ConfigError::new("dashboard.tariff", "must be > 0"));
        }
        if d.budget.is_some_and(|b| !b.is_finite() || b <= 0.0) {
            errors.push(ConfigError::new("dashboard.budget", "must be > 0"));
        }
        if ApplianceSet::by_name(&d.appliances).is_none() {
            errors.push(ConfigError::new(
                "dashboard.appliances",
                format!(
                    "must be \"standard\" or \"extended\", got \"{}\"",
                    d.appliances
                ),
            ));
        }

        let a = &self.alerts;
        if a.threshold_approaching <= 0.0 {
            errors.push(ConfigError::new(
                "alerts.threshold_approaching",
                "must be > 0",
            ));
        }
        if a.threshold_approaching > a.threshold_critical {
            errors.push(ConfigError::new(
                "alerts.threshold_approaching",
                "must be <= alerts.threshold_critical",
            ));
        }
        if a.cooldown_hours < 0 {
            errors.push(ConfigError::new("alerts.cooldown_hours", "must be >= 0"));
        }
        if a.timeout_secs == 0 {
            errors.push(ConfigError::new("alerts.timeout_secs", "must be > 0"));
        }
        if let Some(endpoint) = &a.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            errors.push(ConfigError::new(
                "alerts.endpoint",
                "must start with http:// or https://",
            ));
        }

        let s = &self.scenario;
        if s.tariff.is_some_and(|t| !t.is_finite() || t <= 0.0) {
            errors.push(ConfigError::new("scenario.tariff", "must be > 0"));
        }
        if s.load_adjustment_pct.abs() > LOAD_ADJUSTMENT_LIMIT_PCT {
            errors.push(ConfigError::new(
                "scenario.load_adjustment_pct",
                "must be within [-50, 50]",
            ));
        }

        errors
    }

    /// Returns the configuration if it validates cleanly.
    ///
    /// # Errors
    ///
    /// Returns `WattcastError::Config` with the error count and the first error.
    pub fn into_validated(self) -> Result<Self, WattcastError> {
        let mut errors = self.validate();
        if errors.is_empty() {
            return Ok(self);
        }
        let count = errors.len();
        Err(WattcastError::Config {
            count,
            first: errors.swap_remove(0),
        })
    }
}
