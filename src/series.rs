//! Lookback series generation.
//!
//! A lookback series is taken from the sample dataset when one covers the
//! requested window, padded with a linear trend plus uniform noise when the
//! sample is short, and fully synthesized when there is no sample at all.

use serde::{Deserialize, Serialize};

use crate::dataset::{PeriodKey, SampleDataset};
use crate::noise::NoiseSource;

/// Which lookback series to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Measured consumption.
    Actual,
    /// What the model forecast for the lookback window.
    ForecastPast,
}

/// Linear trend plus noise: `base + i * increment + u * random_range`, `u ∈ [0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    pub base: f64,
    pub increment: f64,
    pub random_range: f64,
}

impl TrendParams {
    /// Built-in defaults for a series kind.
    pub fn defaults(kind: SeriesKind) -> Self {
        match kind {
            SeriesKind::Actual => Self {
                base: 4.2,
                increment: 0.15,
                random_range: 0.8,
            },
            SeriesKind::ForecastPast => Self {
                base: 4.1,
                increment: 0.15,
                random_range: 0.9,
            },
        }
    }

    /// Defaults with any dataset-level overrides applied.
    pub fn resolve(kind: SeriesKind, dataset: Option<&SampleDataset>) -> Self {
        let defaults = Self::defaults(kind);
        let Some(overrides) = dataset.map(|d| d.trend_override(kind)) else {
            return defaults;
        };
        Self {
            base: overrides.base.unwrap_or(defaults.base),
            increment: overrides.increment.unwrap_or(defaults.increment),
            random_range: overrides.random_range.unwrap_or(defaults.random_range),
        }
    }

    /// Trend value at `index` before noise.
    pub fn trend_at(&self, index: usize) -> f64 {
        self.base + index as f64 * self.increment
    }

    /// Trend value at `index` with one noise draw added.
    pub fn sample(&self, index: usize, noise: &mut impl NoiseSource) -> f64 {
        self.trend_at(index) + noise.unit() * self.random_range
    }
}

/// Produces a lookback series of exactly `points` values.
///
/// # Arguments
///
/// * `points` - Number of hourly values to produce
/// * `dataset` - Sample dataset, `None` when loading failed
/// * `period` - Period key used to look up the sample, `None` for
///   non-canonical windows
/// * `kind` - Actual or past-forecast series
/// * `noise` - Uniform noise source for synthesized values
///
/// # Returns
///
/// The sample prefix when the sample covers `points`; otherwise the whole
/// sample followed by trend values whose index continues from the sample
/// length.
pub fn generate_series(
    points: usize,
    dataset: Option<&SampleDataset>,
    period: Option<PeriodKey>,
    kind: SeriesKind,
    noise: &mut impl NoiseSource,
) -> Vec<f64> {
    let params = TrendParams::resolve(kind, dataset);
    let sample: &[f64] = match (dataset, period) {
        (Some(ds), Some(p)) => ds.lookback(p, kind).unwrap_or(&[]),
        _ => &[],
    };

    if sample.len() >= points {
        return sample[..points].to_vec();
    }

    let mut series = Vec::with_capacity(points);
    series.extend_from_slice(sample);
    for i in sample.len()..points {
        series.push(params.sample(i, noise));
    }
    series
}

/// Lookback "actual" series. See [`generate_series`].
pub fn generate_actual(
    points: usize,
    dataset: Option<&SampleDataset>,
    period: Option<PeriodKey>,
    noise: &mut impl NoiseSource,
) -> Vec<f64> {
    generate_series(points, dataset, period, SeriesKind::Actual, noise)
}

/// Lookback "forecast past" series. See [`generate_series`].
pub fn generate_forecast_past(
    points: usize,
    dataset: Option<&SampleDataset>,
    period: Option<PeriodKey>,
    noise: &mut impl NoiseSource,
) -> Vec<f64> {
    generate_series(points, dataset, period, SeriesKind::ForecastPast, noise)
}
