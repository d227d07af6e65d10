//! Chart aggregation: from the accumulated record set to chart points.
//!
//! Every call rebuilds the output from scratch against the full record set;
//! selector changes re-run this without re-fetching anything. The pass is:
//!
//! filter (per series) -> group by date (first-encounter order) -> sum ->
//! per-series totals conversion (cumulative as-is, daily as clamped deltas)

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{
    date_label, ChartData, ChartPoint, DailyRecord, SeriesParams, TotalsMode, ViewParams,
};

/// Produce the chart point sequence for the current view.
///
/// Each distinct date in the filtered set yields exactly one point; records
/// sharing a date sum into their series' slot, which is what rolls multiple
/// provinces up into a country-level line. A record may feed both series.
pub fn curate_chart_data(records: &[DailyRecord], view: &ViewParams) -> ChartData {
    let mut series: Vec<&SeriesParams> = vec![&view.primary];
    if let Some(secondary) = &view.secondary {
        series.push(secondary);
    }

    let labels = series_labels(&series);

    let mut points: Vec<ChartPoint> = Vec::new();
    let mut by_date: HashMap<NaiveDate, usize> = HashMap::new();

    for record in records {
        for (si, params) in series.iter().enumerate() {
            if !params.matches(record) {
                continue;
            }

            let n_series = series.len();
            let idx = *by_date.entry(record.date).or_insert_with(|| {
                points.push(ChartPoint {
                    date: record.date,
                    label: date_label(record.date),
                    values: vec![None; n_series],
                });
                points.len() - 1
            });

            let slot = &mut points[idx].values[si];
            *slot = Some(slot.unwrap_or(0) + params.metric.value_of(record));
        }
    }

    for (si, params) in series.iter().enumerate() {
        if params.totals == TotalsMode::Daily {
            to_daily(&mut points, si);
        }
    }

    ChartData { labels, points }
}

/// Replace each non-first present value with the clamped delta from the
/// previous present value. The first present value stays cumulative.
fn to_daily(points: &mut [ChartPoint], series: usize) {
    let mut prev: Option<u64> = None;
    for point in points.iter_mut() {
        if let Some(v) = point.values[series] {
            if let Some(p) = prev {
                point.values[series] = Some(v.saturating_sub(p));
            }
            prev = Some(v);
        }
    }
}

/// Series display labels, disambiguated when both series resolve to the
/// same metric and region (the two lines must stay independently
/// addressable even though they summarize the same rows).
fn series_labels(series: &[&SeriesParams]) -> Vec<String> {
    let mut labels: Vec<String> = series.iter().map(|s| s.label()).collect();
    if labels.len() == 2 && labels[0] == labels[1] {
        labels[0].push_str("-1");
        labels[1].push_str("-2");
    }
    labels
}

/// Distinct countries in the record set, sorted for the selector.
pub fn list_countries(records: &[DailyRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records {
        if !out.contains(&record.country) {
            out.push(record.country.clone());
        }
    }
    out.sort();
    out
}

/// Distinct non-empty provinces of a country, sorted for the selector.
pub fn list_provinces(records: &[DailyRecord], country: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records {
        if record.country == country
            && !record.province.is_empty()
            && !out.contains(&record.province)
        {
            out.push(record.province.clone());
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, SeriesPatch, ViewPatch, ALL_REGIONS};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn rec(day: u32, country: &str, province: &str, confirmed: u64) -> DailyRecord {
        DailyRecord {
            date: d(day),
            country: country.to_string(),
            province: province.to_string(),
            confirmed,
            recovered: confirmed / 2,
            deaths: confirmed / 10,
        }
    }

    fn view(country: &str) -> ViewParams {
        ViewParams::new(SeriesParams::new(country))
    }

    #[test]
    fn daily_mode_reports_first_point_cumulative_then_deltas() {
        let records = vec![rec(22, "US", "", 1), rec(23, "US", "", 5)];
        let chart = curate_chart_data(&records, &view("US"));

        assert_eq!(chart.labels, vec!["confirmed in US"]);
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].label, "1/22");
        assert_eq!(chart.points[0].values, vec![Some(1)]);
        assert_eq!(chart.points[1].values, vec![Some(4)]);
    }

    #[test]
    fn provinces_sum_into_country_rollup() {
        let records = vec![
            rec(22, "China", "Hubei", 10),
            rec(22, "China", "Guangdong", 3),
        ];
        let mut v = view("China");
        v.primary.totals = TotalsMode::Cumulative;

        let chart = curate_chart_data(&records, &v);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].values, vec![Some(13)]);
    }

    #[test]
    fn grouped_sums_match_brute_force() {
        let records = vec![
            rec(22, "China", "Hubei", 10),
            rec(22, "China", "Guangdong", 3),
            rec(22, "US", "", 1),
            rec(23, "China", "Hubei", 20),
            rec(23, "China", "Guangdong", 7),
            rec(23, "US", "", 5),
        ];
        let mut v = view("China");
        v.primary.totals = TotalsMode::Cumulative;

        let chart = curate_chart_data(&records, &v);
        let chart_total: u64 = chart
            .points
            .iter()
            .filter_map(|p| p.values[0])
            .sum();
        let brute_total: u64 = records
            .iter()
            .filter(|r| v.primary.matches(r))
            .map(|r| r.confirmed)
            .sum();
        assert_eq!(chart_total, brute_total);
    }

    #[test]
    fn each_date_appears_at_most_once() {
        let records = vec![
            rec(22, "China", "Hubei", 10),
            rec(22, "China", "Guangdong", 3),
            rec(23, "China", "Hubei", 20),
        ];
        let chart = curate_chart_data(&records, &view("China"));
        let dates: Vec<_> = chart.points.iter().map(|p| p.date).collect();
        let mut deduped = dates.clone();
        deduped.dedup();
        assert_eq!(dates, deduped);
        assert_eq!(dates, vec![d(22), d(23)]);
    }

    #[test]
    fn daily_deltas_prefix_sum_back_to_cumulative() {
        // Monotone non-decreasing cumulative series.
        let records = vec![
            rec(22, "US", "", 3),
            rec(23, "US", "", 3),
            rec(24, "US", "", 8),
            rec(25, "US", "", 21),
        ];

        let mut cumulative_view = view("US");
        cumulative_view.primary.totals = TotalsMode::Cumulative;
        let cumulative = curate_chart_data(&records, &cumulative_view);

        let daily = curate_chart_data(&records, &view("US"));

        let mut prefix = 0u64;
        for (dp, cp) in daily.points.iter().zip(cumulative.points.iter()) {
            prefix = if dp.date == d(22) {
                dp.values[0].unwrap() // first point stays cumulative
            } else {
                prefix + dp.values[0].unwrap()
            };
            assert_eq!(Some(prefix), cp.values[0]);
        }
    }

    #[test]
    fn decreases_clamp_to_zero_in_daily_mode() {
        let records = vec![rec(22, "US", "", 10), rec(23, "US", "", 7)];
        let chart = curate_chart_data(&records, &view("US"));
        assert_eq!(chart.points[1].values, vec![Some(0)]);
    }

    #[test]
    fn all_region_matches_every_record() {
        let records = vec![rec(22, "US", "", 1), rec(22, "China", "Hubei", 10)];
        let mut v = view(ALL_REGIONS);
        v.primary.totals = TotalsMode::Cumulative;

        let chart = curate_chart_data(&records, &v);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].values, vec![Some(11)]);
    }

    #[test]
    fn unmatched_records_are_dropped() {
        let records = vec![rec(22, "US", "", 1), rec(23, "Italy", "", 9)];
        let chart = curate_chart_data(&records, &view("US"));
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].date, d(22));
    }

    #[test]
    fn identical_regions_keep_two_distinct_series() {
        let records = vec![rec(22, "US", "", 1), rec(23, "US", "", 5)];
        let base = view("US");
        let v = base.apply(&ViewPatch {
            secondary_enabled: Some(true),
            secondary: SeriesPatch {
                totals: Some(TotalsMode::Cumulative),
                ..SeriesPatch::default()
            },
            ..ViewPatch::default()
        });

        let chart = curate_chart_data(&records, &v);
        assert_eq!(
            chart.labels,
            vec!["confirmed in US-1", "confirmed in US-2"]
        );
        // Same underlying rows, independently converted: daily vs cumulative.
        assert_eq!(chart.points[1].values, vec![Some(4), Some(5)]);
    }

    #[test]
    fn mixed_series_carry_none_on_missing_dates() {
        let records = vec![
            rec(22, "US", "", 1),
            rec(23, "Italy", "", 9),
            rec(24, "US", "", 5),
        ];
        let base = view("US");
        let v = base.apply(&ViewPatch {
            secondary_enabled: Some(true),
            secondary: SeriesPatch {
                country: Some("Italy".to_string()),
                totals: Some(TotalsMode::Cumulative),
                ..SeriesPatch::default()
            },
            ..ViewPatch::default()
        });

        let chart = curate_chart_data(&records, &v);
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[0].values, vec![Some(1), None]);
        assert_eq!(chart.points[1].values, vec![None, Some(9)]);
        // Daily conversion differences consecutive present values: 5 - 1 = 4.
        assert_eq!(chart.points[2].values, vec![Some(4), None]);
    }

    #[test]
    fn secondary_metric_can_differ() {
        let records = vec![rec(22, "China", "Hubei", 100)];
        let base = view("China");
        let v = base.apply(&ViewPatch {
            secondary_enabled: Some(true),
            secondary: SeriesPatch {
                metric: Some(Metric::Deaths),
                ..SeriesPatch::default()
            },
            ..ViewPatch::default()
        });

        let chart = curate_chart_data(&records, &v);
        assert_eq!(
            chart.labels,
            vec!["confirmed in China", "deaths in China"]
        );
        assert_eq!(chart.points[0].values, vec![Some(100), Some(10)]);
    }

    #[test]
    fn country_and_province_listings() {
        let records = vec![
            rec(22, "US", "", 1),
            rec(22, "China", "Hubei", 10),
            rec(23, "China", "Guangdong", 3),
            rec(23, "China", "Hubei", 12),
        ];
        assert_eq!(list_countries(&records), vec!["China", "US"]);
        assert_eq!(
            list_provinces(&records, "China"),
            vec!["Guangdong", "Hubei"]
        );
        assert!(list_provinces(&records, "US").is_empty());
    }
}
