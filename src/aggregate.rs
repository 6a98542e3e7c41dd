//! Forward/previous totals, appliance ranking and budget classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::forward::ForwardForecast;

/// Lowest and highest allowed scenario load adjustment, in percent.
pub const LOAD_ADJUSTMENT_LIMIT_PCT: f64 = 50.0;

/// Budget usage thresholds in percent of the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetThresholds {
    pub approaching: f64,
    pub critical: f64,
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            approaching: 80.0,
            critical: 100.0,
        }
    }
}

/// Qualitative position of forecast cost relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    Ok,
    Approaching,
    AtRisk,
}

/// Forecast cost as a percentage of the budget.
///
/// Returns `None` when the budget is not a positive finite number.
pub fn usage_percent(cost: f64, budget: f64) -> Option<f64> {
    if budget.is_finite() && budget > 0.0 {
        Some(cost / budget * 100.0)
    } else {
        None
    }
}

impl BudgetStatus {
    /// Classifies `cost` against two usage thresholds.
    ///
    /// The critical threshold wins when both are met. A non-positive budget
    /// or a non-finite usage is `AtRisk`.
    pub fn classify(cost: f64, budget: f64, thresholds: BudgetThresholds) -> Self {
        let Some(usage) = usage_percent(cost, budget).filter(|u| u.is_finite()) else {
            return Self::AtRisk;
        };
        if usage >= thresholds.critical {
            Self::AtRisk
        } else if usage >= thresholds.approaching {
            Self::Approaching
        } else {
            Self::Ok
        }
    }

    /// Two-state classification: `Ok` iff `cost < budget`.
    pub fn binary(cost: f64, budget: f64) -> Self {
        if cost < budget { Self::Ok } else { Self::AtRisk }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Approaching => "Approaching",
            Self::AtRisk => "At-Risk",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What-if overlay applied to forward totals only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Replaces the tariff for forward costs when set.
    pub tariff_override: Option<f64>,
    /// Percent change applied to forward consumption, within ±50.
    pub load_adjustment_pct: f64,
}

impl Scenario {
    /// Creates a scenario, clamping the load adjustment into ±50 %.
    pub fn new(tariff_override: Option<f64>, load_adjustment_pct: f64) -> Self {
        let load_adjustment_pct = if load_adjustment_pct.is_finite() {
            load_adjustment_pct.clamp(-LOAD_ADJUSTMENT_LIMIT_PCT, LOAD_ADJUSTMENT_LIMIT_PCT)
        } else {
            0.0
        };
        Self {
            tariff_override,
            load_adjustment_pct,
        }
    }

    /// Factor applied to forward kWh.
    pub fn load_multiplier(&self) -> f64 {
        1.0 + self.load_adjustment_pct / 100.0
    }

    /// Tariff used for forward costs.
    pub fn effective_tariff(&self, base_tariff: f64) -> f64 {
        self.tariff_override.unwrap_or(base_tariff)
    }
}

/// Forward consumption and cost for one appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceUsage {
    pub key: &'static str,
    pub name: &'static str,
    pub kwh: f64,
    pub cost: f64,
}

/// Returns the appliance with the strictly highest cost.
///
/// Ties go to the appliance listed first.
pub fn top_appliance(usages: &[ApplianceUsage]) -> Option<&ApplianceUsage> {
    let mut best: Option<&ApplianceUsage> = None;
    for usage in usages {
        match best {
            Some(b) if usage.cost <= b.cost => {}
            _ => best = Some(usage),
        }
    }
    best
}

/// Appliances ordered by cost, highest first. Ties keep listed order.
pub fn rank_by_cost(usages: &[ApplianceUsage]) -> Vec<&ApplianceUsage> {
    let mut ranked: Vec<&ApplianceUsage> = usages.iter().collect();
    ranked.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    ranked
}

/// Human-readable forward window, e.g. "Next 4 Hours".
pub fn period_text(forecast_hours: usize) -> String {
    if forecast_hours == 1 {
        "Next 1 Hour".to_string()
    } else {
        format!("Next {forecast_hours} Hours")
    }
}

/// Change of forward consumption relative to the previous window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub delta_kwh: f64,
    /// `None` when the previous window consumed nothing.
    pub change_pct: Option<f64>,
}

/// Aggregated view of one generation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// Per-appliance usage in appliance-set order.
    pub appliances: Vec<ApplianceUsage>,
    pub next_kwh: f64,
    pub next_cost: f64,
    pub prev_kwh: f64,
    pub prev_cost: f64,
    /// Tariff applied to forward costs.
    pub effective_tariff: f64,
    pub top_appliance: Option<&'static str>,
    pub budget: f64,
    pub usage_percent: Option<f64>,
    pub budget_status: BudgetStatus,
}

impl ForecastSummary {
    /// Computes totals and classification from generated series.
    ///
    /// # Arguments
    ///
    /// * `forward` - Forward per-appliance series
    /// * `lookback_actual` - Lookback actual readings
    /// * `tariff` - Base currency-per-kWh rate
    /// * `budget` - Spending ceiling for the forward window
    /// * `thresholds` - Usage thresholds for the budget status
    /// * `scenario` - Optional what-if overlay; never touches previous totals
    pub fn compute(
        forward: &ForwardForecast,
        lookback_actual: &[f64],
        tariff: f64,
        budget: f64,
        thresholds: BudgetThresholds,
        scenario: Option<&Scenario>,
    ) -> Self {
        let multiplier = scenario.map_or(1.0, Scenario::load_multiplier);
        let effective_tariff = scenario.map_or(tariff, |s| s.effective_tariff(tariff));

        let appliances: Vec<ApplianceUsage> = forward
            .appliances
            .iter()
            .map(|series| {
                let kwh = series.kwh() * multiplier;
                ApplianceUsage {
                    key: series.key,
                    name: series.name,
                    kwh,
                    cost: kwh * effective_tariff,
                }
            })
            .collect();

        let next_kwh: f64 = appliances.iter().map(|a| a.kwh).sum();
        let next_cost = next_kwh * effective_tariff;
        let prev_kwh: f64 = lookback_actual.iter().sum();
        let top = top_appliance(&appliances).map(|a| a.name);

        Self {
            next_kwh,
            next_cost,
            prev_kwh,
            prev_cost: prev_kwh * tariff,
            effective_tariff,
            top_appliance: top,
            budget,
            usage_percent: usage_percent(next_cost, budget),
            budget_status: BudgetStatus::classify(next_cost, budget, thresholds),
            appliances,
        }
    }

    /// Appliances ordered by cost, highest first.
    pub fn ranking(&self) -> Vec<&ApplianceUsage> {
        rank_by_cost(&self.appliances)
    }

    /// Forward vs previous window consumption.
    pub fn comparison(&self) -> PeriodComparison {
        let delta_kwh = self.next_kwh - self.prev_kwh;
        let change_pct = (self.prev_kwh > 0.0).then(|| delta_kwh / self.prev_kwh * 100.0);
        PeriodComparison {
            delta_kwh,
            change_pct,
        }
    }
}

impl fmt::Display for ForecastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Forecast Summary ---")?;
        writeln!(
            f,
            "Next period:      {:.2} kWh  cost {:.2}",
            self.next_kwh, self.next_cost
        )?;
        writeln!(
            f,
            "Previous period:  {:.2} kWh  cost {:.2}",
            self.prev_kwh, self.prev_cost
        )?;
        writeln!(f, "Top appliance:    {}", self.top_appliance.unwrap_or("-"))?;
        match self.usage_percent {
            Some(pct) => writeln!(
                f,
                "Budget status:    {} ({pct:.0}% of {:.2})",
                self.budget_status, self.budget
            )?,
            None => writeln!(f, "Budget status:    {}", self.budget_status)?,
        }
        write!(f, "Ranking:")?;
        for (i, a) in self.ranking().iter().enumerate() {
            write!(
                f,
                "\n  {}. {:<16} {:>7.2} kWh {:>9.2}",
                i + 1,
                a.name,
                a.kwh,
                a.cost
            )?;
        }
        Ok(())
    }
}
