//! CSV export of the combined chart series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::dashboard::DashboardSnapshot;

/// Column header for chart export.
const HEADER: &str = "label,window,actual_kwh,forecast_kwh";

/// Exports a snapshot's chart series to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(snapshot: &DashboardSnapshot, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(snapshot, buf)
}

/// Writes one row per label: lookback rows first, then forward rows.
///
/// Forward rows leave `actual_kwh` empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(snapshot: &DashboardSnapshot, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(','))?;

    let prev_points = snapshot.labels.prev_points;
    let rows = snapshot
        .labels
        .combined()
        .into_iter()
        .zip(&snapshot.actual_series)
        .zip(&snapshot.forecast_series)
        .enumerate();

    for (i, ((label, actual), forecast)) in rows {
        let window = if i < prev_points { "lookback" } else { "forward" };
        wtr.write_record([
            label,
            window.to_string(),
            actual.map(|v| format!("{v:.4}")).unwrap_or_default(),
            format!("{forecast:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
