//! Forward-window per-appliance series.

use serde::Serialize;

use crate::appliance::{ApplianceDescriptor, ApplianceSet};
use crate::dataset::{PeriodKey, SampleDataset};
use crate::noise::NoiseSource;

/// Forward readings for one appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplianceSeries {
    pub key: &'static str,
    pub name: &'static str,
    pub values: Vec<f64>,
}

impl ApplianceSeries {
    /// Sum of the readings in kWh.
    pub fn kwh(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Forward readings for every appliance, in appliance-set order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForwardForecast {
    pub appliances: Vec<ApplianceSeries>,
}

impl ForwardForecast {
    /// Series for one appliance key.
    pub fn get(&self, key: &str) -> Option<&ApplianceSeries> {
        self.appliances.iter().find(|a| a.key == key)
    }

    /// Values for one appliance key, empty when absent.
    pub fn values(&self, key: &str) -> &[f64] {
        match self.get(key) {
            Some(series) => &series.values,
            None => &[],
        }
    }

    /// Number of hourly points per appliance.
    pub fn points(&self) -> usize {
        self.appliances.first().map_or(0, |a| a.values.len())
    }

    /// Hour-by-hour sum over all appliances.
    pub fn total_series(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.points()];
        for appliance in &self.appliances {
            for (slot, v) in total.iter_mut().zip(&appliance.values) {
                *slot += v;
            }
        }
        total
    }

    /// Total forward consumption in kWh.
    pub fn total_kwh(&self) -> f64 {
        self.appliances.iter().map(ApplianceSeries::kwh).sum()
    }
}

fn synthesis_range(
    descriptor: &ApplianceDescriptor,
    dataset: Option<&SampleDataset>,
) -> (f64, f64) {
    dataset
        .and_then(|d| d.range_for(descriptor.display_name))
        .unwrap_or(descriptor.default_range)
}

/// Synthesizes `points` readings per appliance.
///
/// Each reading is a uniform draw from the dataset's range for the appliance
/// when one is present and well formed, otherwise from the descriptor's
/// default range. Draws are taken point by point across appliances.
pub fn generate_appliance_forecast(
    points: usize,
    dataset: Option<&SampleDataset>,
    appliances: &ApplianceSet,
    noise: &mut impl NoiseSource,
) -> ForwardForecast {
    let ranges: Vec<(f64, f64)> = appliances
        .iter()
        .map(|d| synthesis_range(d, dataset))
        .collect();
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(points); appliances.len()];

    for _ in 0..points {
        for (series, &(min, max)) in values.iter_mut().zip(&ranges) {
            series.push(noise.uniform(min, max));
        }
    }

    ForwardForecast {
        appliances: appliances
            .iter()
            .zip(values)
            .map(|(d, values)| ApplianceSeries {
                key: d.key,
                name: d.display_name,
                values,
            })
            .collect(),
    }
}

/// Builds the forward forecast, preferring sample data over synthesis.
///
/// For every appliance with a sample series for `period`:
/// - sample length ≥ `points`: the sample prefix is used;
/// - otherwise the sample is kept and the synthesized series supplies the
///   tail from index `sample.len()`.
///
/// Appliances without a sample keep their synthesized series.
pub fn compose_forward(
    points: usize,
    dataset: Option<&SampleDataset>,
    period: Option<PeriodKey>,
    appliances: &ApplianceSet,
    noise: &mut impl NoiseSource,
) -> ForwardForecast {
    let mut forecast = generate_appliance_forecast(points, dataset, appliances, noise);
    let (Some(ds), Some(period)) = (dataset, period) else {
        return forecast;
    };

    for (descriptor, series) in appliances.iter().zip(forecast.appliances.iter_mut()) {
        let Some(sample) = ds.forward(period, descriptor.sample_key) else {
            continue;
        };
        if sample.len() >= points {
            series.values = sample[..points].to_vec();
        } else {
            let mut values = sample.to_vec();
            values.extend_from_slice(&series.values[sample.len()..]);
            series.values = values;
        }
    }
    forecast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ApplianceRange, PeriodSample};
    use crate::noise::{ConstantNoise, seeded};

    fn dataset_with_forward(entries: &[(&str, Vec<f64>)]) -> SampleDataset {
        let mut ds = SampleDataset::default();
        let mut period = PeriodSample::default();
        for (key, values) in entries {
            period.forecast.insert((*key).to_string(), values.clone());
        }
        ds.sample_data.insert("4hours".to_string(), period);
        ds
    }

    #[test]
    fn synthetic_values_respect_default_ranges() {
        let set = ApplianceSet::with_washing_machine();
        let mut rng = seeded(11);
        let fc = generate_appliance_forecast(48, None, &set, &mut rng);
        assert_eq!(fc.appliances.len(), 4);
        for (series, d) in fc.appliances.iter().zip(set.iter()) {
            assert_eq!(series.values.len(), 48);
            let (lo, hi) = d.default_range;
            let in_range = series.values.iter().all(|v| *v >= lo && *v < hi);
            assert!(in_range, "{}", d.key);
        }
    }

    #[test]
    fn dataset_ranges_override_defaults() {
        let mut ds = SampleDataset::default();
        ds.appliance_ranges
            .insert("Air Conditioner".to_string(), ApplianceRange::new(5.0, 5.0));
        let mut noise = ConstantNoise::new(0.3);
        let fc = generate_appliance_forecast(2, Some(&ds), &ApplianceSet::standard(), &mut noise);
        assert_eq!(fc.get("ac").map(|s| s.values.clone()), Some(vec![5.0, 5.0]));
        let fan = fc.get("fan").map(ApplianceSeries::kwh).unwrap_or_default();
        assert!((fan - 2.0 * (0.05 + 0.3 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn full_sample_replaces_synthesis() {
        let ds = dataset_with_forward(&[("ac", vec![1.0, 2.0, 3.0, 4.0, 5.0])]);
        let mut rng = seeded(5);
        let fc = compose_forward(
            4,
            Some(&ds),
            Some(PeriodKey::FourHours),
            &ApplianceSet::standard(),
            &mut rng,
        );
        assert_eq!(
            fc.get("ac").map(|s| s.values.as_slice()),
            Some(&[1.0, 2.0, 3.0, 4.0][..])
        );
        let fan = fc.get("fan").map(|s| s.values.clone()).unwrap_or_default();
        assert_eq!(fan.len(), 4);
        assert!(fan.iter().all(|v| (0.05..0.15).contains(v)));
    }

    #[test]
    fn short_sample_keeps_prefix_and_synthetic_tail() {
        let ds = dataset_with_forward(&[("refrigerator", vec![9.0, 9.0])]);
        let mut noise = ConstantNoise::new(0.0);
        let fc = compose_forward(
            4,
            Some(&ds),
            Some(PeriodKey::FourHours),
            &ApplianceSet::standard(),
            &mut noise,
        );
        assert_eq!(
            fc.get("ref").map(|s| s.values.clone()),
            Some(vec![9.0, 9.0, 1.1, 1.1])
        );
    }

    #[test]
    fn total_series_sums_per_hour() {
        let fc = ForwardForecast {
            appliances: vec![
                ApplianceSeries {
                    key: "a",
                    name: "A",
                    values: vec![1.0, 2.0],
                },
                ApplianceSeries {
                    key: "b",
                    name: "B",
                    values: vec![0.5, 0.5],
                },
            ],
        };
        assert_eq!(fc.total_series(), vec![1.5, 2.5]);
        assert_eq!(fc.total_kwh(), 4.0);
        assert_eq!(fc.points(), 2);
    }
}
