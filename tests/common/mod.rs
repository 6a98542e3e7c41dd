//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use wattcast::dataset::{ApplianceRange, LookbackSample, PeriodSample, SampleDataset};

/// Fixed reference time (2025-01-01 00:30).
pub fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 30, 0))
        .expect("valid reference date")
}

/// Dataset with a flat four-hour sample: `ac` and `refrigerator` at 1 kWh,
/// no fan or washing machine sample.
pub fn four_hour_dataset() -> SampleDataset {
    let mut period = PeriodSample {
        lookback: LookbackSample {
            actual: vec![3.0, 3.5, 4.0, 4.5],
            forecast: vec![3.2, 3.4, 4.1, 4.4],
        },
        ..PeriodSample::default()
    };
    let forecast = &mut period.forecast;
    forecast.insert("ac".to_string(), vec![1.0; 4]);
    forecast.insert("refrigerator".to_string(), vec![1.0; 4]);

    let mut ds = SampleDataset::default();
    ds.sample_data.insert("4hours".to_string(), period);
    ds.appliance_ranges
        .insert("Electric Fan".to_string(), ApplianceRange::new(0.05, 0.15));
    ds.appliance_ranges
        .insert("Washing Machine".to_string(), ApplianceRange::new(0.7, 0.9));
    ds
}

/// Bundled sample dataset path, relative to the crate root.
pub const SAMPLE_DATASET: &str = "data/sample_dataset.json";
