//! Export the aggregated chart sequence to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ChartData;
use crate::error::AppError;

/// Write the chart points to a CSV file: `date` plus one column per series.
///
/// A date where a series has no value gets an empty cell.
pub fn write_series_csv(path: &Path, chart: &ChartData) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    let mut header = String::from("date");
    for label in &chart.labels {
        header.push(',');
        header.push_str(&csv_field(label));
    }
    writeln!(file, "{header}")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for point in &chart.points {
        let mut row = point.date.to_string();
        for value in &point.values {
            row.push(',');
            if let Some(v) = value {
                row.push_str(&v.to_string());
            }
        }
        writeln!(file, "{row}")
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a field if it contains a delimiter or quote.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(csv_field("confirmed in US"), "confirmed in US");
    }

    #[test]
    fn delimiters_force_quoting() {
        assert_eq!(csv_field("deaths in Korea, South"), "\"deaths in Korea, South\"");
    }
}
