//! CSV ingest and normalization.
//!
//! This module turns raw daily-snapshot CSV text into normalized
//! [`DailyRecord`]s and drives the day-by-day ingestion loop.
//!
//! Design goals:
//! - **Header-driven schema**: column positions are resolved from each
//!   file's own header row, because the source renamed its columns over
//!   time (`Country/Region` → `Country_Region` and so on)
//! - **Lenient cells**: a missing or malformed count degrades to 0
//! - **Explicit failure policy**: a failed day is recorded, and whether it
//!   truncates or skips is a named decision, not an accident
//! - **Separation of concerns**: no aggregation logic here

use chrono::NaiveDate;
use csv::StringRecord;

use crate::data::normalize::{normalize_country, normalize_province};
use crate::data::CsseClient;
use crate::domain::{DailyRecord, DateWindow, FailurePolicy};
use crate::error::AppError;

/// A day that could not be ingested.
#[derive(Debug, Clone)]
pub struct DayFailure {
    pub date: NaiveDate,
    pub message: String,
}

/// Ingest output: the accumulated record set plus what happened along the way.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<DailyRecord>,
    pub window: DateWindow,
    pub days_loaded: u32,
    pub failures: Vec<DayFailure>,
}

impl IngestedData {
    /// True when at least one day in the window is missing.
    pub fn is_partial(&self) -> bool {
        self.days_loaded < self.window.day_count()
    }
}

/// Resolved column positions for one file's header row.
#[derive(Debug, Clone)]
struct ColumnMap {
    country: usize,
    province: Option<usize>,
    confirmed: Option<usize>,
    recovered: Option<usize>,
    deaths: Option<usize>,
}

/// Run the full ingestion loop: one fetch+parse per day, strictly
/// sequential and in ascending date order.
///
/// `progress` is invoked after every completed day with the floored
/// percentage and the day just processed; each call corresponds to one
/// discrete append to the record set.
pub fn run_ingest(
    client: &CsseClient,
    window: DateWindow,
    policy: FailurePolicy,
    progress: &mut dyn FnMut(u8, NaiveDate),
) -> IngestedData {
    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut days_loaded = 0u32;

    for (i, date) in window.dates().enumerate() {
        let day = client
            .fetch_day(date)
            .and_then(|text| parse_daily_csv(&text, date));

        match day {
            Ok(rows) => {
                records.extend(rows);
                days_loaded += 1;
            }
            Err(err) => {
                failures.push(DayFailure {
                    date,
                    message: err.to_string(),
                });
                if policy == FailurePolicy::Stop {
                    progress(window.progress_pct(i as u32 + 1), date);
                    break;
                }
            }
        }

        progress(window.progress_pct(i as u32 + 1), date);
    }

    IngestedData {
        records,
        window,
        days_loaded,
        failures,
    }
}

/// Parse one day's CSV text into normalized records.
pub fn parse_daily_csv(text: &str, date: NaiveDate) -> Result<Vec<DailyRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers for {date}: {e}")))?
        .clone();

    let columns = resolve_columns(&headers)
        .ok_or_else(|| AppError::data(format!("No country column in snapshot for {date}.")))?;

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| AppError::data(format!("Bad CSV row for {date}: {e}")))?;
        if let Some(record) = record_from_row(&row, &columns, date) {
            out.push(record);
        }
    }

    Ok(out)
}

/// Resolve column positions from a header row.
///
/// Matching is by substring/case-insensitive name rather than position:
/// early files use `Country/Region`, later ones `Country_Region`, and the
/// later format also prepends FIPS/admin columns.
fn resolve_columns(headers: &StringRecord) -> Option<ColumnMap> {
    let mut country = None;
    let mut province = None;
    let mut confirmed = None;
    let mut recovered = None;
    let mut deaths = None;

    for (i, raw) in headers.iter().enumerate() {
        let name = raw.trim_start_matches('\u{feff}');
        if name.contains("Country") {
            country.get_or_insert(i);
        } else if name.contains("Province") {
            province.get_or_insert(i);
        } else if name.eq_ignore_ascii_case("Confirmed") {
            confirmed.get_or_insert(i);
        } else if name.eq_ignore_ascii_case("Recovered") {
            recovered.get_or_insert(i);
        } else if name.eq_ignore_ascii_case("Deaths") {
            deaths.get_or_insert(i);
        }
    }

    Some(ColumnMap {
        country: country?,
        province,
        confirmed,
        recovered,
        deaths,
    })
}

fn record_from_row(row: &StringRecord, columns: &ColumnMap, date: NaiveDate) -> Option<DailyRecord> {
    let country_raw = row.get(columns.country)?;
    if country_raw.is_empty() {
        return None;
    }

    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

    Some(DailyRecord {
        date,
        country: normalize_country(country_raw),
        province: normalize_province(cell(columns.province)),
        confirmed: parse_count(cell(columns.confirmed)),
        recovered: parse_count(cell(columns.recovered)),
        deaths: parse_count(cell(columns.deaths)),
    })
}

/// Safe count parsing: malformed or missing cells become 0.
fn parse_count(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return v;
    }
    // A few files carry counts as floats ("10.0").
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const EARLY_FORMAT: &str = "\
Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered
Hubei,Mainland China,1/23/2020 17:00,444,17,28
,Japan,1/23/2020 17:00,2,,
,Thailand,1/23/2020 17:00,4,0,2
";

    const LATE_FORMAT: &str = "\
FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key
45001,Abbeville,South Carolina,US,2020-04-01 21:58:49,34.2,-82.4,6,0,0,6,\"Abbeville, South Carolina, US\"
,,Hubei,China,2020-04-01 21:58:49,30.9,112.2,67802,3187,63326,1289,\"Hubei, China\"
";

    #[test]
    fn parses_early_header_format() {
        let records = parse_daily_csv(EARLY_FORMAT, d(2020, 1, 23)).unwrap();
        assert_eq!(records.len(), 3);

        let hubei = &records[0];
        assert_eq!(hubei.country, "China"); // normalized from "Mainland China"
        assert_eq!(hubei.province, "Hubei");
        assert_eq!(hubei.confirmed, 444);
        assert_eq!(hubei.deaths, 17);
        assert_eq!(hubei.recovered, 28);

        // Missing count cells degrade to 0.
        let japan = &records[1];
        assert_eq!(japan.province, "");
        assert_eq!(japan.confirmed, 2);
        assert_eq!(japan.deaths, 0);
        assert_eq!(japan.recovered, 0);
    }

    #[test]
    fn parses_late_header_format() {
        let records = parse_daily_csv(LATE_FORMAT, d(2020, 4, 1)).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].country, "US");
        assert_eq!(records[0].province, "South Carolina");
        assert_eq!(records[0].confirmed, 6);

        assert_eq!(records[1].country, "China");
        assert_eq!(records[1].confirmed, 67802);
    }

    #[test]
    fn bom_on_first_header_is_tolerated() {
        let text = "\u{feff}Province/State,Country/Region,Confirmed\nHubei,China,10\n";
        let records = parse_daily_csv(text, d(2020, 2, 1)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].confirmed, 10);
    }

    #[test]
    fn missing_country_column_is_an_error() {
        let text = "Province/State,Confirmed\nHubei,10\n";
        assert!(parse_daily_csv(text, d(2020, 2, 1)).is_err());
    }

    #[test]
    fn malformed_counts_become_zero() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("12.0"), 12);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count("-3"), 0);
    }
}
