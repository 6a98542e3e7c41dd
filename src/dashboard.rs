//! Composition of one dashboard snapshot per forecast request.
//!
//! The [`Dashboard`] owns the (optional) sample dataset and the appliance
//! set. Every call to [`Dashboard::snapshot`] regenerates all derived state
//! from scratch: labels, lookback series, forward per-appliance series and
//! the aggregated summary.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{BudgetThresholds, ForecastSummary, PeriodComparison, Scenario, period_text};
use crate::appliance::{ApplianceDescriptor, ApplianceSet};
use crate::dataset::{DatasetSettings, PeriodKey, SampleDataset};
use crate::forward::{ForwardForecast, compose_forward};
use crate::labels::{WindowLabels, generate_labels};
use crate::noise::NoiseSource;
use crate::series::{generate_actual, generate_forecast_past};

/// Tariff used when neither the request nor the dataset provides one.
pub const DEFAULT_TARIFF: f64 = 13.47;
/// Budget used when neither the request nor the dataset provides one.
pub const DEFAULT_BUDGET: f64 = 300.0;
/// Longest forward or lookback window accepted from configuration or queries.
pub const MAX_WINDOW_HOURS: i64 = 168;
/// Furthest a view may be shifted from its reference, in days either way.
pub const MAX_DAY_OFFSET: i64 = 366;

/// Range of the synthesized forward "Others" readings in the breakdown view.
const OTHERS_FORWARD_RANGE: (f64, f64) = (0.05, 0.10);

/// Which consumption the chart series show.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ApplianceFilter {
    /// Household totals.
    #[default]
    All,
    /// One appliance; lookback totals are scaled by its lookback share.
    Appliance(&'static str),
    /// Household totals plus one series per appliance and an "Others" series.
    Breakdown,
}

impl ApplianceFilter {
    /// Resolves `"all"`, `"breakdown"` or an appliance key/display name against `set`.
    pub fn parse(value: &str, set: &ApplianceSet) -> Option<Self> {
        if value.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        if value.eq_ignore_ascii_case("breakdown") {
            return Some(Self::Breakdown);
        }
        set.find(value).map(|d| Self::Appliance(d.key))
    }
}

/// Parameters of one dashboard view.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub forecast_hours: i64,
    pub lookback_hours: i64,
    /// Anchor of the label windows.
    pub reference: NaiveDateTime,
    /// Base tariff; falls back to the dataset default, then [`DEFAULT_TARIFF`].
    pub tariff: Option<f64>,
    /// Budget; falls back to the dataset default, then [`DEFAULT_BUDGET`].
    pub budget: Option<f64>,
    pub filter: ApplianceFilter,
    pub scenario: Option<Scenario>,
}

impl ForecastRequest {
    /// One-hour windows anchored at `reference` with default parameters.
    pub fn new(reference: NaiveDateTime) -> Self {
        Self {
            forecast_hours: 1,
            lookback_hours: 1,
            reference,
            tariff: None,
            budget: None,
            filter: ApplianceFilter::All,
            scenario: None,
        }
    }

    /// Same request anchored `days` days later (earlier when negative).
    pub fn shifted_days(&self, days: i64) -> Self {
        Self {
            reference: self.reference + Duration::days(days),
            ..self.clone()
        }
    }

    /// Same request anchored one day earlier.
    pub fn previous_day(&self) -> Self {
        self.shifted_days(-1)
    }

    /// Same request anchored one day later.
    pub fn next_day(&self) -> Self {
        self.shifted_days(1)
    }

    /// Period key for sample lookup; `None` for non-canonical horizons.
    pub fn period(&self) -> Option<PeriodKey> {
        PeriodKey::from_hours(self.forecast_hours)
    }
}

/// One line of the breakdown chart: lookback share of the totals, then the
/// forward readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Everything needed to render one dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub period: Option<PeriodKey>,
    pub period_text: String,
    pub labels: WindowLabels,
    /// Lookback actual readings after the filter.
    pub prev_actual: Vec<f64>,
    /// Lookback past-forecast readings after the filter.
    pub prev_forecast: Vec<f64>,
    /// Forward readings after the filter, unadjusted by scenario mode.
    pub next_forecast: Vec<f64>,
    /// Lookback actual followed by one gap per forward label.
    pub actual_series: Vec<Option<f64>>,
    /// Lookback past forecast followed by the forward forecast.
    pub forecast_series: Vec<f64>,
    pub forward: ForwardForecast,
    pub summary: ForecastSummary,
    pub comparison: PeriodComparison,
    /// Per-appliance lines; empty unless the filter is [`ApplianceFilter::Breakdown`].
    pub breakdown: Vec<BreakdownSeries>,
    pub tariff: f64,
    pub budget: f64,
}

/// Dataset-backed snapshot builder.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    dataset: Option<SampleDataset>,
    appliances: ApplianceSet,
}

impl Dashboard {
    /// Creates a dashboard; `None` runs in synthesize-only mode.
    pub fn new(dataset: Option<SampleDataset>, appliances: ApplianceSet) -> Self {
        Self {
            dataset,
            appliances,
        }
    }

    pub fn dataset(&self) -> Option<&SampleDataset> {
        self.dataset.as_ref()
    }

    pub fn appliances(&self) -> &ApplianceSet {
        &self.appliances
    }

    /// Tariff for `request` after dataset and built-in fallbacks.
    pub fn resolve_tariff(&self, request: &ForecastRequest) -> f64 {
        request
            .tariff
            .or_else(|| self.defaults().and_then(|s| s.default_tariff))
            .unwrap_or(DEFAULT_TARIFF)
    }

    /// Budget for `request` after dataset and built-in fallbacks.
    pub fn resolve_budget(&self, request: &ForecastRequest) -> f64 {
        request
            .budget
            .or_else(|| self.defaults().and_then(|s| s.default_budget))
            .unwrap_or(DEFAULT_BUDGET)
    }

    fn defaults(&self) -> Option<&DatasetSettings> {
        self.dataset.as_ref().map(|d| &d.settings)
    }

    /// Builds a full snapshot for `request`.
    ///
    /// Draws from `noise` in a fixed order: forward appliances, lookback
    /// actual, lookback past forecast, then the breakdown "Others" line.
    pub fn snapshot(
        &self,
        request: &ForecastRequest,
        thresholds: BudgetThresholds,
        noise: &mut impl NoiseSource,
    ) -> DashboardSnapshot {
        let dataset = self.dataset.as_ref();
        let period = request.period();
        let labels = generate_labels(
            request.reference,
            request.forecast_hours,
            request.lookback_hours,
        );

        let forward = compose_forward(labels.next_points, dataset, period, &self.appliances, noise);
        let total_actual = generate_actual(labels.prev_points, dataset, period, noise);
        let total_forecast = generate_forecast_past(labels.prev_points, dataset, period, noise);

        let tariff = self.resolve_tariff(request);
        let budget = self.resolve_budget(request);
        let summary = ForecastSummary::compute(
            &forward,
            &total_actual,
            tariff,
            budget,
            thresholds,
            request.scenario.as_ref(),
        );

        let (prev_actual, prev_forecast, next_forecast) = match self.filtered(request.filter) {
            Some(d) => (
                scaled(&total_actual, d.lookback_share),
                scaled(&total_forecast, d.lookback_share),
                forward.values(d.key).to_vec(),
            ),
            None => (total_actual, total_forecast, forward.total_series()),
        };
        let breakdown = match request.filter {
            ApplianceFilter::Breakdown => {
                self.breakdown(&prev_actual, &forward, labels.next_points, noise)
            }
            _ => Vec::new(),
        };

        let actual_series = prev_actual
            .iter()
            .copied()
            .map(Some)
            .chain(std::iter::repeat_n(None, labels.next_points))
            .collect();
        let forecast_series = prev_forecast
            .iter()
            .chain(&next_forecast)
            .copied()
            .collect();

        debug!(
            period = ?period,
            next_kwh = summary.next_kwh,
            next_cost = summary.next_cost,
            status = %summary.budget_status,
            "snapshot computed"
        );

        DashboardSnapshot {
            period,
            period_text: period_text(labels.next_points),
            comparison: summary.comparison(),
            labels,
            prev_actual,
            prev_forecast,
            next_forecast,
            actual_series,
            forecast_series,
            forward,
            summary,
            breakdown,
            tariff,
            budget,
        }
    }

    fn breakdown(
        &self,
        prev_actual: &[f64],
        forward: &ForwardForecast,
        next_points: usize,
        noise: &mut impl NoiseSource,
    ) -> Vec<BreakdownSeries> {
        let mut lines: Vec<BreakdownSeries> = self
            .appliances
            .iter()
            .map(|d| BreakdownSeries {
                name: d.display_name.to_string(),
                values: scaled(prev_actual, d.lookback_share)
                    .into_iter()
                    .chain(forward.values(d.key).iter().copied())
                    .collect(),
            })
            .collect();

        let covered: f64 = self.appliances.iter().map(|d| d.lookback_share).sum();
        let (min, max) = OTHERS_FORWARD_RANGE;
        let others = scaled(prev_actual, (1.0 - covered).max(0.0))
            .into_iter()
            .chain((0..next_points).map(|_| noise.uniform(min, max)))
            .collect();
        lines.push(BreakdownSeries {
            name: "Others".to_string(),
            values: others,
        });
        lines
    }

    fn filtered(&self, filter: ApplianceFilter) -> Option<&ApplianceDescriptor> {
        match filter {
            ApplianceFilter::All | ApplianceFilter::Breakdown => None,
            ApplianceFilter::Appliance(key) => self.appliances.find(key),
        }
    }
}

fn scaled(values: &[f64], share: f64) -> Vec<f64> {
    values.iter().map(|v| v * share).collect()
}
