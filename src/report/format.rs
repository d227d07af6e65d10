//! String formatters for the `chart` subcommand and shared banners.

use crate::domain::ChartData;
use crate::io::ingest::IngestedData;

/// Source attribution, shown under every chart.
pub const ATTRIBUTION: &str =
    "Data provided by CSSE at Johns Hopkins University (github.com/CSSEGISandData/COVID-19)";

/// Format the ingest summary: window, coverage, and any failed days.
pub fn format_ingest_summary(ingest: &IngestedData) -> String {
    let mut out = String::new();

    out.push_str("=== trend - COVID-19 daily snapshots ===\n");
    out.push_str(&format!(
        "Window: {} -> {} ({} days)\n",
        ingest.window.epoch,
        ingest.window.asof,
        ingest.window.day_count()
    ));
    out.push_str(&format!(
        "Loaded: {}/{} days | records: {}\n",
        ingest.days_loaded,
        ingest.window.day_count(),
        ingest.records.len()
    ));

    if ingest.is_partial() {
        out.push_str("Warning: partial data (some days failed to load).\n");
        for failure in &ingest.failures {
            out.push_str(&format!("  {}: {}\n", failure.date, failure.message));
        }
    }

    out
}

/// Format the chart point sequence as an aligned table.
///
/// One date column plus one value column per series; a blank cell means the
/// series had no matching record on that date.
pub fn format_series_table(chart: &ChartData) -> String {
    let mut widths: Vec<usize> = Vec::with_capacity(chart.labels.len() + 1);
    widths.push("date".len());
    for label in &chart.labels {
        widths.push(label.len());
    }

    for point in &chart.points {
        widths[0] = widths[0].max(point.label.len());
        for (i, value) in point.values.iter().enumerate() {
            if let Some(v) = value {
                widths[i + 1] = widths[i + 1].max(v.to_string().len());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{:<w$}", "date", w = widths[0]));
    for (i, label) in chart.labels.iter().enumerate() {
        out.push_str(&format!("  {:>w$}", label, w = widths[i + 1]));
    }
    out.push('\n');

    for point in &chart.points {
        out.push_str(&format!("{:<w$}", point.label, w = widths[0]));
        for (i, value) in point.values.iter().enumerate() {
            match value {
                Some(v) => out.push_str(&format!("  {:>w$}", v, w = widths[i + 1])),
                None => out.push_str(&format!("  {:>w$}", "", w = widths[i + 1])),
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartPoint, DateWindow};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    #[test]
    fn series_table_aligns_and_blanks_missing() {
        let chart = ChartData {
            labels: vec!["confirmed in US".to_string(), "deaths in Italy".to_string()],
            points: vec![
                ChartPoint {
                    date: d(22),
                    label: "1/22".to_string(),
                    values: vec![Some(1), None],
                },
                ChartPoint {
                    date: d(23),
                    label: "1/23".to_string(),
                    values: vec![Some(400), Some(9)],
                },
            ],
        };

        let txt = format_series_table(&chart);
        let expected = concat!(
            "date  confirmed in US  deaths in Italy\n",
            "1/22                1                 \n",
            "1/23              400                9\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn partial_ingest_gets_a_warning_banner() {
        let window = DateWindow::new(d(22), d(24)).unwrap();
        let ingest = IngestedData {
            records: Vec::new(),
            window,
            days_loaded: 1,
            failures: vec![crate::io::ingest::DayFailure {
                date: d(24),
                message: "Request for 2020-01-24 failed with status 404.".to_string(),
            }],
        };

        let txt = format_ingest_summary(&ingest);
        assert!(txt.contains("Loaded: 1/2 days"));
        assert!(txt.contains("Warning: partial data"));
        assert!(txt.contains("2020-01-24"));
    }
}
