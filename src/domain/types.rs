//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to CSV
//! - reloaded later for plotting or comparisons

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sentinel region name meaning "no filter" — matches every record.
///
/// Used both as a country value (chart the whole data set) and as a
/// province value (chart the whole country, no subregion filter).
pub const ALL_REGIONS: &str = "All";

/// Which count field is being charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Recovered,
    Deaths,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Confirmed, Metric::Recovered, Metric::Deaths];

    /// Human-readable label for selectors and series names.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Recovered => "recovered",
            Metric::Deaths => "deaths",
        }
    }

    /// Extract this metric's count from a record.
    pub fn value_of(self, record: &DailyRecord) -> u64 {
        match self {
            Metric::Confirmed => record.confirmed,
            Metric::Recovered => record.recovered,
            Metric::Deaths => record.deaths,
        }
    }

    pub fn next(self) -> Metric {
        match self {
            Metric::Confirmed => Metric::Recovered,
            Metric::Recovered => Metric::Deaths,
            Metric::Deaths => Metric::Confirmed,
        }
    }

    pub fn prev(self) -> Metric {
        match self {
            Metric::Confirmed => Metric::Deaths,
            Metric::Recovered => Metric::Confirmed,
            Metric::Deaths => Metric::Recovered,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Whether a series is presented as running totals or day-over-day deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TotalsMode {
    Daily,
    Cumulative,
}

impl TotalsMode {
    pub fn display_name(self) -> &'static str {
        match self {
            TotalsMode::Daily => "daily",
            TotalsMode::Cumulative => "cumulative",
        }
    }

    pub fn toggled(self) -> TotalsMode {
        match self {
            TotalsMode::Daily => TotalsMode::Cumulative,
            TotalsMode::Cumulative => TotalsMode::Daily,
        }
    }
}

impl std::fmt::Display for TotalsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What to do when a single day's fetch or parse fails.
///
/// The upstream repository occasionally has missing or malformed days, so
/// this is a real decision rather than an edge case: `stop` truncates the
/// window at the first failure, `skip` records the gap and keeps going.
/// Either way the failure ends up in the ingest report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop ingesting at the first failed day (partial data up to the gap).
    Stop,
    /// Skip failed days and continue through the window.
    Skip,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FailurePolicy::Stop => "stop",
            FailurePolicy::Skip => "skip",
        })
    }
}

/// One row per (date, country, province) from a single daily snapshot.
///
/// `country` and `province` hold normalized display names; an empty
/// `province` means the row has no subregion. Counts default to 0 when the
/// source cell is missing or unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub country: String,
    pub province: String,
    pub confirmed: u64,
    pub recovered: u64,
    pub deaths: u64,
}

/// Selector state for one chart series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesParams {
    pub country: String,
    /// Province display name, or [`ALL_REGIONS`] for no subregion filter.
    pub province: String,
    pub metric: Metric,
    pub totals: TotalsMode,
}

impl SeriesParams {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            province: ALL_REGIONS.to_string(),
            metric: Metric::Confirmed,
            totals: TotalsMode::Daily,
        }
    }

    /// The effective region: the province when one is selected, else the country.
    pub fn region(&self) -> &str {
        if self.province == ALL_REGIONS {
            &self.country
        } else {
            &self.province
        }
    }

    /// Whether a record belongs to this series.
    ///
    /// The [`ALL_REGIONS`] region matches everything; otherwise the record
    /// matches on either its province or its country, so a country-level
    /// selection rolls up all of that country's provinces.
    pub fn matches(&self, record: &DailyRecord) -> bool {
        let region = self.region();
        region == ALL_REGIONS || record.province == region || record.country == region
    }

    /// Display label, e.g. `"confirmed in China"`.
    pub fn label(&self) -> String {
        format!("{} in {}", self.metric.display_name(), self.region())
    }
}

/// The full selector state: a primary series and an optional comparison series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub primary: SeriesParams,
    pub secondary: Option<SeriesParams>,
}

impl ViewParams {
    pub fn new(primary: SeriesParams) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Apply a partial patch, producing a new view.
    ///
    /// Unset patch fields keep their current values. This is deliberate and
    /// explicit: an empty province string or a freshly-toggled totals mode is
    /// a real value, never "unset".
    pub fn apply(&self, patch: &ViewPatch) -> ViewParams {
        let primary = patch.primary.apply(&self.primary);

        let secondary = match patch.secondary_enabled {
            Some(false) => None,
            Some(true) => {
                // A newly enabled comparison starts from the existing
                // secondary if there was one, else mirrors the primary.
                let base = self.secondary.as_ref().unwrap_or(&primary);
                Some(patch.secondary.apply(base))
            }
            None => self
                .secondary
                .as_ref()
                .map(|base| patch.secondary.apply(base)),
        };

        ViewParams { primary, secondary }
    }
}

/// Partial update to one series' selectors.
#[derive(Debug, Clone, Default)]
pub struct SeriesPatch {
    pub country: Option<String>,
    pub province: Option<String>,
    pub metric: Option<Metric>,
    pub totals: Option<TotalsMode>,
}

impl SeriesPatch {
    pub fn apply(&self, base: &SeriesParams) -> SeriesParams {
        SeriesParams {
            country: self.country.clone().unwrap_or_else(|| base.country.clone()),
            province: self
                .province
                .clone()
                .unwrap_or_else(|| base.province.clone()),
            metric: self.metric.unwrap_or(base.metric),
            totals: self.totals.unwrap_or(base.totals),
        }
    }

    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Self::default()
        }
    }

    pub fn province(province: impl Into<String>) -> Self {
        Self {
            province: Some(province.into()),
            ..Self::default()
        }
    }
}

/// Partial update to the full view.
#[derive(Debug, Clone, Default)]
pub struct ViewPatch {
    pub primary: SeriesPatch,
    pub secondary: SeriesPatch,
    /// `Some(true)` enables the comparison series, `Some(false)` removes it,
    /// `None` leaves it as-is.
    pub secondary_enabled: Option<bool>,
}

/// One charted date: the axis label plus one value slot per active series.
///
/// `values` is parallel to [`ChartData::labels`]. A `None` slot means that
/// series had no matching record on this date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub label: String,
    pub values: Vec<Option<u64>>,
}

/// The full chart output: series labels plus the ordered point sequence.
///
/// Rebuilt from scratch on every aggregation pass; dates appear in
/// first-encounter order, which is chronological given sorted ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// One series as `(day offset from first point, value)` pairs, skipping
    /// dates where the series has no value. Suitable for plotting.
    pub fn series_xy(&self, series: usize) -> Vec<(f64, f64)> {
        let Some(first) = self.points.first() else {
            return Vec::new();
        };
        self.points
            .iter()
            .filter_map(|p| {
                let v = p.values.get(series).copied().flatten()?;
                let x = (p.date - first.date).num_days() as f64;
                Some((x, v as f64))
            })
            .collect()
    }
}

/// The ingestion date window, computed once at startup.
///
/// Days are generated strictly after `epoch` through `asof` inclusive,
/// matching the source's publication pattern (the epoch day itself has no
/// snapshot to fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub epoch: NaiveDate,
    pub asof: NaiveDate,
}

/// Default epoch: the day before the first published daily snapshot.
pub const DEFAULT_EPOCH: &str = "2020-01-22";

impl DateWindow {
    pub fn new(epoch: NaiveDate, asof: NaiveDate) -> Result<Self, AppError> {
        if asof <= epoch {
            return Err(AppError::config(format!(
                "As-of date {asof} must be after the epoch {epoch}."
            )));
        }
        Ok(Self { epoch, asof })
    }

    /// Number of days in the window.
    pub fn day_count(&self) -> u32 {
        (self.asof - self.epoch).num_days() as u32
    }

    /// Ascending dates in the window.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (1..=self.day_count() as i64).map(|i| self.epoch + chrono::Duration::days(i))
    }

    /// Snapshot filename for a date, e.g. `03-07-2020.csv`.
    pub fn filename(date: NaiveDate) -> String {
        format!("{:02}-{:02}-{}.csv", date.month(), date.day(), date.year())
    }

    /// Percentage complete after `loaded` of `day_count()` days.
    pub fn progress_pct(&self, loaded: u32) -> u8 {
        let total = self.day_count().max(1);
        ((loaded as u64 * 100) / total as u64).min(100) as u8
    }
}

/// Chart axis label for a date, e.g. `1/22` (no leading zeros).
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(country: &str, province: &str) -> DailyRecord {
        DailyRecord {
            date: d(2020, 1, 23),
            country: country.to_string(),
            province: province.to_string(),
            confirmed: 1,
            recovered: 0,
            deaths: 0,
        }
    }

    #[test]
    fn region_resolves_to_province_when_selected() {
        let mut series = SeriesParams::new("China");
        assert_eq!(series.region(), "China");

        series.province = "Hubei".to_string();
        assert_eq!(series.region(), "Hubei");
    }

    #[test]
    fn all_region_matches_every_record() {
        let series = SeriesParams::new(ALL_REGIONS);
        assert!(series.matches(&record("US", "")));
        assert!(series.matches(&record("China", "Hubei")));
    }

    #[test]
    fn country_selection_rolls_up_provinces() {
        let series = SeriesParams::new("China");
        assert!(series.matches(&record("China", "Hubei")));
        assert!(series.matches(&record("China", "Guangdong")));
        assert!(!series.matches(&record("US", "")));
    }

    #[test]
    fn province_selection_filters_within_country() {
        let mut series = SeriesParams::new("China");
        series.province = "Hubei".to_string();
        assert!(series.matches(&record("China", "Hubei")));
        assert!(!series.matches(&record("China", "Guangdong")));
    }

    #[test]
    fn patch_preserves_unset_fields() {
        let view = ViewParams::new(SeriesParams::new("US"));
        let next = view.apply(&ViewPatch {
            primary: SeriesPatch {
                metric: Some(Metric::Deaths),
                ..SeriesPatch::default()
            },
            ..ViewPatch::default()
        });
        assert_eq!(next.primary.country, "US");
        assert_eq!(next.primary.metric, Metric::Deaths);
        assert_eq!(next.primary.totals, TotalsMode::Daily);
    }

    #[test]
    fn patch_treats_empty_province_as_a_value() {
        let mut base = SeriesParams::new("US");
        base.province = "Washington".to_string();
        let view = ViewParams::new(base);

        let next = view.apply(&ViewPatch {
            primary: SeriesPatch::province(""),
            ..ViewPatch::default()
        });
        // Empty string is a deliberate selection, not "unset".
        assert_eq!(next.primary.province, "");
    }

    #[test]
    fn enabling_secondary_mirrors_primary() {
        let mut primary = SeriesParams::new("China");
        primary.metric = Metric::Deaths;
        let view = ViewParams::new(primary.clone());

        let next = view.apply(&ViewPatch {
            secondary_enabled: Some(true),
            ..ViewPatch::default()
        });
        assert_eq!(next.secondary, Some(primary));

        let off = next.apply(&ViewPatch {
            secondary_enabled: Some(false),
            ..ViewPatch::default()
        });
        assert_eq!(off.secondary, None);
    }

    #[test]
    fn window_excludes_epoch_and_includes_asof() {
        let window = DateWindow::new(d(2020, 1, 22), d(2020, 1, 25)).unwrap();
        let dates: Vec<_> = window.dates().collect();
        assert_eq!(dates, vec![d(2020, 1, 23), d(2020, 1, 24), d(2020, 1, 25)]);
        assert_eq!(window.day_count(), 3);
    }

    #[test]
    fn window_rejects_inverted_range() {
        assert!(DateWindow::new(d(2020, 3, 1), d(2020, 2, 1)).is_err());
    }

    #[test]
    fn filename_is_mm_dd_yyyy() {
        assert_eq!(DateWindow::filename(d(2020, 3, 7)), "03-07-2020.csv");
        assert_eq!(DateWindow::filename(d(2020, 11, 23)), "11-23-2020.csv");
    }

    #[test]
    fn progress_is_floored_percentage() {
        let window = DateWindow::new(d(2020, 1, 22), d(2020, 1, 29)).unwrap();
        assert_eq!(window.day_count(), 7);
        assert_eq!(window.progress_pct(1), 14); // floor(1/7*100)
        assert_eq!(window.progress_pct(7), 100);
    }

    #[test]
    fn date_labels_drop_leading_zeros() {
        assert_eq!(date_label(d(2020, 1, 22)), "1/22");
        assert_eq!(date_label(d(2020, 11, 3)), "11/3");
    }
}
