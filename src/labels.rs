//! Hourly timestamp labels for the lookback and forward windows.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Label format: `MM/DD/YY HH:MM`.
pub const LABEL_FORMAT: &str = "%m/%d/%y %H:%M";

/// Labels for both windows plus their point counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowLabels {
    /// Oldest first, ending one hour before the reference.
    pub prev_labels: Vec<String>,
    /// Starting at the reference.
    pub next_labels: Vec<String>,
    pub prev_points: usize,
    pub next_points: usize,
}

impl WindowLabels {
    /// Lookback labels followed by forward labels.
    pub fn combined(&self) -> Vec<String> {
        self.prev_labels
            .iter()
            .chain(&self.next_labels)
            .cloned()
            .collect()
    }
}

/// Formats `reference` shifted by `offset_hours`.
pub fn format_hour(reference: NaiveDateTime, offset_hours: i64) -> String {
    (reference + Duration::hours(offset_hours))
        .format(LABEL_FORMAT)
        .to_string()
}

/// Point count for a window length; anything below one hour yields one point.
pub fn window_points(hours: i64) -> usize {
    usize::try_from(hours.max(1)).unwrap_or(1)
}

/// Generates labels for both windows around `reference`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wattcast::labels::generate_labels;
///
/// let reference = NaiveDate::from_ymd_opt(2025, 3, 9)
///     .and_then(|d| d.and_hms_opt(14, 0, 0))
///     .expect("valid date");
/// let labels = generate_labels(reference, 4, 1);
/// assert_eq!(labels.prev_labels, vec!["03/09/25 13:00"]);
/// assert_eq!(labels.next_labels[0], "03/09/25 14:00");
/// assert_eq!(labels.next_points, 4);
/// ```
pub fn generate_labels(
    reference: NaiveDateTime,
    forecast_hours: i64,
    lookback_hours: i64,
) -> WindowLabels {
    let prev_points = window_points(lookback_hours);
    let next_points = window_points(forecast_hours);

    let prev_labels = (1..=prev_points)
        .rev()
        .map(|back| format_hour(reference, -(back as i64)))
        .collect();
    let next_labels = (0..next_points)
        .map(|ahead| format_hour(reference, ahead as i64))
        .collect();

    WindowLabels {
        prev_labels,
        next_labels,
        prev_points,
        next_points,
    }
}
