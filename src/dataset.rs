//! Sample dataset: pre-baked lookback and forward readings per period.
//!
//! The dataset is an external JSON document shaped like:
//!
//! ```json
//! {
//!   "applianceRanges": { "Air Conditioner": { "min": 2.2, "max": 2.8 } },
//!   "sampleData": {
//!     "4hours": {
//!       "lookback": { "actual": [4.1, 4.3], "forecast": [4.0, 4.4] },
//!       "forecast": { "ac": [2.3, 2.5, 2.4, 2.6], "refrigerator": [1.2, 1.2, 1.3, 1.1] }
//!     }
//!   },
//!   "settings": { "defaultTariff": 13.47, "defaultBudget": 300 }
//! }
//! ```
//!
//! Every section is optional. Malformed range entries are kept but ignored
//! by [`SampleDataset::range_for`] so generators fall back to their defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WattcastError};
use crate::series::SeriesKind;

/// Canonical forward-window lengths that have pre-baked sample data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PeriodKey {
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "4hours")]
    FourHours,
    #[serde(rename = "8hours")]
    EightHours,
    #[serde(rename = "24hours")]
    TwentyFourHours,
}

impl PeriodKey {
    /// All period keys, shortest first.
    pub const ALL: [PeriodKey; 4] = [
        PeriodKey::OneHour,
        PeriodKey::FourHours,
        PeriodKey::EightHours,
        PeriodKey::TwentyFourHours,
    ];

    /// Maps a forward-window length to its period key.
    ///
    /// Returns `None` for lengths without pre-baked data.
    pub fn from_hours(hours: i64) -> Option<Self> {
        match hours {
            1 => Some(Self::OneHour),
            4 => Some(Self::FourHours),
            8 => Some(Self::EightHours),
            24 => Some(Self::TwentyFourHours),
            _ => None,
        }
    }

    /// Key used in the `sampleData` map.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1hour",
            Self::FourHours => "4hours",
            Self::EightHours => "8hours",
            Self::TwentyFourHours => "24hours",
        }
    }

    /// Window length in hours.
    pub fn hours(self) -> i64 {
        match self {
            Self::OneHour => 1,
            Self::FourHours => 4,
            Self::EightHours => 8,
            Self::TwentyFourHours => 24,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds used to synthesize an appliance's readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplianceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ApplianceRange {
    /// Creates a fully specified range.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Returns `(min, max)` when both bounds are finite and ordered.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() && max >= min => {
                Some((min, max))
            }
            _ => None,
        }
    }
}

/// Historical readings for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookbackSample {
    pub actual: Vec<f64>,
    pub forecast: Vec<f64>,
}

/// Pre-baked data for one period key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSample {
    pub lookback: LookbackSample,
    /// Forward readings keyed by appliance sample key (`ac`, `refrigerator`, ...).
    pub forecast: BTreeMap<String, Vec<f64>>,
}

/// Defaults bundled with the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetSettings {
    pub default_tariff: Option<f64>,
    pub default_budget: Option<f64>,
    pub appliances: Vec<String>,
}

/// Immutable sample dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SampleDataset {
    /// Synthesis bounds keyed by appliance display name.
    pub appliance_ranges: BTreeMap<String, ApplianceRange>,
    /// Pre-baked readings keyed by period key string.
    pub sample_data: BTreeMap<String, PeriodSample>,
    pub settings: DatasetSettings,
    pub actual_base_value: Option<f64>,
    pub actual_increment: Option<f64>,
    pub actual_random_range: Option<f64>,
    pub forecast_base_value: Option<f64>,
    pub forecast_increment: Option<f64>,
    pub forecast_random_range: Option<f64>,
}

/// Per-dataset overrides of the lookback trend model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendOverride {
    pub base: Option<f64>,
    pub increment: Option<f64>,
    pub random_range: Option<f64>,
}

impl SampleDataset {
    /// Parses a dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a dataset from disk.
    ///
    /// # Errors
    ///
    /// Returns `WattcastError::FileRead` or `WattcastError::JsonParse`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| WattcastError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&content).map_err(|source| WattcastError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            periods = dataset.sample_data.len(),
            ranges = dataset.appliance_ranges.len(),
            "sample dataset loaded"
        );
        Ok(dataset)
    }

    /// Loads a dataset, logging and returning `None` on failure.
    ///
    /// Callers treat `None` as "always synthesize".
    pub fn load_or_degrade(path: &Path) -> Option<Self> {
        match Self::from_json_file(path) {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                warn!(error = %e, "sample dataset unavailable, synthesizing all series");
                None
            }
        }
    }

    /// Pre-baked data for a period, if any.
    pub fn period(&self, period: PeriodKey) -> Option<&PeriodSample> {
        self.sample_data.get(period.as_str())
    }

    /// Lookback sample of the given kind for a period.
    pub fn lookback(&self, period: PeriodKey, kind: SeriesKind) -> Option<&[f64]> {
        self.period(period).map(|p| match kind {
            SeriesKind::Actual => p.lookback.actual.as_slice(),
            SeriesKind::ForecastPast => p.lookback.forecast.as_slice(),
        })
    }

    /// Forward sample for one appliance sample key.
    pub fn forward(&self, period: PeriodKey, sample_key: &str) -> Option<&[f64]> {
        self.period(period)
            .and_then(|p| p.forecast.get(sample_key))
            .map(Vec::as_slice)
    }

    /// Well-formed synthesis bounds for an appliance display name.
    pub fn range_for(&self, name: &str) -> Option<(f64, f64)> {
        self.appliance_ranges
            .get(name)
            .and_then(ApplianceRange::bounds)
    }

    /// Trend overrides for a lookback series kind.
    pub fn trend_override(&self, kind: SeriesKind) -> TrendOverride {
        match kind {
            SeriesKind::Actual => TrendOverride {
                base: self.actual_base_value,
                increment: self.actual_increment,
                random_range: self.actual_random_range,
            },
            SeriesKind::ForecastPast => TrendOverride {
                base: self.forecast_base_value,
                increment: self.forecast_increment,
                random_range: self.forecast_random_range,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
    {
      "applianceRanges": {
        "Air Conditioner": { "min": 2.0, "max": 3.0 },
        "Refrigerator": { "min": 1.5 },
        "Electric Fan": { "min": 0.3, "max": 0.1 }
      },
      "sampleData": {
        "4hours": {
          "lookback": { "actual": [4.0, 4.5], "forecast": [4.1] },
          "forecast": { "ac": [1, 1, 1, 1] }
        }
      },
      "settings": { "defaultTariff": 12.5 },
      "actualBaseValue": 5.0,
      "somethingElse": true
    }"#;

    #[test]
    fn parses_camel_case_document() {
        let ds = SampleDataset::from_json_str(DOC).expect("dataset should parse");
        assert_eq!(ds.settings.default_tariff, Some(12.5));
        assert_eq!(ds.settings.default_budget, None);
        assert_eq!(
            ds.lookback(PeriodKey::FourHours, SeriesKind::Actual),
            Some(&[4.0, 4.5][..])
        );
        assert_eq!(ds.forward(PeriodKey::FourHours, "ac"), Some(&[1.0; 4][..]));
        assert_eq!(ds.forward(PeriodKey::FourHours, "refrigerator"), None);
        assert_eq!(ds.lookback(PeriodKey::OneHour, SeriesKind::Actual), None);
        assert_eq!(ds.trend_override(SeriesKind::Actual).base, Some(5.0));
        assert_eq!(ds.trend_override(SeriesKind::ForecastPast).base, None);
    }

    #[test]
    fn malformed_ranges_are_ignored() {
        let ds = SampleDataset::from_json_str(DOC).expect("dataset should parse");
        assert_eq!(ds.range_for("Air Conditioner"), Some((2.0, 3.0)));
        assert_eq!(ds.range_for("Refrigerator"), None);
        assert_eq!(ds.range_for("Electric Fan"), None);
        assert_eq!(ds.range_for("Washing Machine"), None);
    }

    #[test]
    fn empty_document_is_valid() {
        let ds = SampleDataset::from_json_str("{}").expect("empty object should parse");
        assert!(ds.sample_data.is_empty());
        assert!(ds.appliance_ranges.is_empty());
    }

    #[test]
    fn period_key_mapping() {
        for key in PeriodKey::ALL {
            assert_eq!(PeriodKey::from_hours(key.hours()), Some(key));
        }
        assert_eq!(PeriodKey::from_hours(6), None);
        assert_eq!(PeriodKey::from_hours(0), None);
        assert_eq!(PeriodKey::TwentyFourHours.to_string(), "24hours");
    }

    #[test]
    fn missing_file_degrades() {
        let ds = SampleDataset::load_or_degrade(Path::new("/nonexistent/dataset.json"));
        assert!(ds.is_none());
    }
}
