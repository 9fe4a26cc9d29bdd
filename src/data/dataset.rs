//! Dataset Module
//! Aggregates raw per-location series by country or sub-region, re-indexed
//! to a relative "days since outbreak start" axis with day-over-day deltas.

use crate::data::loader::RawRow;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Leading days with at most this many confirmed cases are discarded so
/// locations line up on "days since outbreak start".
pub const DEFAULT_THRESHOLD: u64 = 15;

/// One point of an aggregated series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// Relative day index after threshold filtering, contiguous from 0.
    pub day: usize,
    pub confirmed: u64,
    /// Change from the previous retained point, 0 for the first one.
    pub delta: i64,
}

/// Threshold-filtered cumulative series for one location.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedSeries {
    pub location: String,
    pub visible: bool,
    pub points: Vec<SeriesPoint>,
}

/// Per-location summary line for the selection list.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub location: String,
    /// Latest cumulative count; the series is cumulative, so also the max.
    pub max_confirmed: u64,
    /// Date of the first retained point.
    pub start_date: NaiveDate,
    pub visible: bool,
}

/// Aggregated series plus their location list, recomputed wholesale on every
/// view change. Visibility is kept consistent between both collections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dataset {
    pub series: Vec<AggregatedSeries>,
    pub locations: Vec<LocationSummary>,
}

impl Dataset {
    /// Build a dataset from filtered series, deriving the location list
    /// sorted descending by latest count.
    pub fn new(series: Vec<AggregatedSeries>) -> Self {
        let mut locations: Vec<LocationSummary> = series
            .iter()
            .filter_map(|s| {
                let first = s.points.first()?;
                let last = s.points.last()?;
                Some(LocationSummary {
                    location: s.location.clone(),
                    max_confirmed: last.confirmed,
                    start_date: first.date,
                    visible: s.visible,
                })
            })
            .collect();
        locations.sort_by(|a, b| b.max_confirmed.cmp(&a.max_confirmed));

        Self { series, locations }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Show exactly the given locations and hide everything else.
    pub fn set_visible_locations(&mut self, visible: &[&str]) {
        self.for_each_visibility(|location| visible.contains(&location));
    }

    pub fn set_visibility_for_all(&mut self, show: bool) {
        self.for_each_visibility(|_| show);
    }

    pub fn set_visibility_for_location(&mut self, location: &str, show: bool) {
        for s in &mut self.series {
            if s.location == location {
                s.visible = show;
            }
        }
        for l in &mut self.locations {
            if l.location == location {
                l.visible = show;
            }
        }
    }

    pub fn visible_series(&self) -> impl Iterator<Item = &AggregatedSeries> {
        self.series.iter().filter(|s| s.visible)
    }

    fn for_each_visibility<F: Fn(&str) -> bool>(&mut self, f: F) {
        for s in &mut self.series {
            s.visible = f(&s.location);
        }
        for l in &mut self.locations {
            l.visible = f(&l.location);
        }
    }
}

/// Group rows by country, summing counts across sub-regions per date, then
/// threshold-filter each country series. Per-country work is independent and
/// fans out through rayon.
pub fn aggregate_by_country(rows: &[RawRow], threshold: u64) -> Dataset {
    let mut by_country: BTreeMap<&str, BTreeMap<NaiveDate, u64>> = BTreeMap::new();
    for row in rows {
        let totals = by_country.entry(row.country.as_str()).or_default();
        for &(date, confirmed) in &row.series {
            *totals.entry(date).or_insert(0) += confirmed;
        }
    }

    let grouped: Vec<(&str, BTreeMap<NaiveDate, u64>)> = by_country.into_iter().collect();
    let series: Vec<AggregatedSeries> = grouped
        .par_iter()
        .filter_map(|(country, totals)| {
            // Dates where the summed count is still zero carry no signal.
            let points: Vec<(NaiveDate, u64)> = totals
                .iter()
                .map(|(&date, &confirmed)| (date, confirmed))
                .filter(|&(_, confirmed)| confirmed > 0)
                .collect();
            filter_by_threshold(country, &points, threshold)
        })
        .collect();

    Dataset::new(series)
}

/// One series per sub-region of the given country, no summing. Rows without
/// a state name fall back to the country name (single-region countries).
pub fn aggregate_by_region(rows: &[RawRow], country: &str, threshold: u64) -> Dataset {
    let series: Vec<AggregatedSeries> = rows
        .iter()
        .filter(|row| row.country == country)
        .filter_map(|row| {
            let location = row.state.as_deref().unwrap_or(&row.country);
            filter_by_threshold(location, &row.series, threshold)
        })
        .collect();

    Dataset::new(series)
}

/// Drop leading points at or below the threshold; once crossed, keep all
/// subsequent points. Day indices restart at 0 on the first kept point and
/// deltas are consecutive differences among kept points (0 for the first).
/// Returns `None` when no point crosses the threshold.
pub fn filter_by_threshold(
    location: &str,
    points: &[(NaiveDate, u64)],
    threshold: u64,
) -> Option<AggregatedSeries> {
    let mut kept: Vec<SeriesPoint> = Vec::new();
    let mut prev: Option<u64> = None;

    for &(date, confirmed) in points {
        // Strict comparison: a point exactly equal to the threshold is
        // still part of the discarded lead-in.
        if prev.is_none() && confirmed <= threshold {
            continue;
        }
        let delta = match prev {
            Some(p) => confirmed as i64 - p as i64,
            None => 0,
        };
        kept.push(SeriesPoint {
            date,
            day: kept.len(),
            confirmed,
            delta,
        });
        prev = Some(confirmed);
    }

    if kept.is_empty() {
        return None;
    }
    Some(AggregatedSeries {
        location: location.to_string(),
        visible: true,
        points: kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    fn row(country: &str, state: Option<&str>, counts: &[(u32, u32, u64)]) -> RawRow {
        RawRow {
            country: country.to_string(),
            state: state.map(str::to_string),
            series: counts.iter().map(|&(m, d, c)| (date(m, d), c)).collect(),
        }
    }

    #[test]
    fn threshold_filter_keeps_suffix_and_reindexes() {
        let points: Vec<(NaiveDate, u64)> = [10u64, 12, 16, 20]
            .iter()
            .enumerate()
            .map(|(i, &c)| (date(1, 22 + i as u32), c))
            .collect();

        let s = filter_by_threshold("Italy", &points, 15).unwrap();
        let confirmed: Vec<u64> = s.points.iter().map(|p| p.confirmed).collect();
        let days: Vec<usize> = s.points.iter().map(|p| p.day).collect();
        assert_eq!(confirmed, vec![16, 20]);
        assert_eq!(days, vec![0, 1]);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let points = vec![(date(1, 22), 15), (date(1, 23), 16)];
        let s = filter_by_threshold("Italy", &points, 15).unwrap();
        assert_eq!(s.points.len(), 1);
        assert_eq!(s.points[0].confirmed, 16);
    }

    #[test]
    fn first_retained_delta_is_zero_then_consecutive_difference() {
        let points = vec![(date(1, 22), 16), (date(1, 23), 20), (date(1, 24), 19)];
        let s = filter_by_threshold("Italy", &points, 15).unwrap();
        let deltas: Vec<i64> = s.points.iter().map(|p| p.delta).collect();
        assert_eq!(deltas, vec![0, 4, -1]);
    }

    #[test]
    fn series_below_threshold_is_dropped() {
        let points = vec![(date(1, 22), 3), (date(1, 23), 5)];
        assert!(filter_by_threshold("Italy", &points, 15).is_none());
    }

    #[test]
    fn day_indices_are_contiguous_despite_date_gaps() {
        let points = vec![(date(1, 22), 20), (date(1, 25), 30), (date(2, 9), 40)];
        let s = filter_by_threshold("Italy", &points, 15).unwrap();
        let days: Vec<usize> = s.points.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![0, 1, 2]);
    }

    #[test]
    fn country_aggregation_sums_sub_regions() {
        let rows = vec![
            row("Italy", Some("North"), &[(1, 22, 5), (1, 23, 20)]),
            row("Italy", Some("South"), &[(1, 22, 10), (1, 23, 30)]),
        ];

        let ds = aggregate_by_country(&rows, 0);
        assert_eq!(ds.series.len(), 1);
        let confirmed: Vec<u64> = ds.series[0].points.iter().map(|p| p.confirmed).collect();
        assert_eq!(confirmed, vec![15, 50]);
    }

    #[test]
    fn country_aggregation_drops_zero_sum_dates() {
        let rows = vec![row("Italy", None, &[(1, 22, 0), (1, 23, 20)])];
        let ds = aggregate_by_country(&rows, 0);
        assert_eq!(ds.series[0].points[0].confirmed, 20);
        assert_eq!(ds.series[0].points[0].day, 0);
    }

    #[test]
    fn region_aggregation_keeps_sub_regions_separate() {
        let rows = vec![
            row("Italy", Some("North"), &[(1, 22, 20), (1, 23, 25)]),
            row("Italy", Some("South"), &[(1, 22, 30), (1, 23, 45)]),
            row("France", None, &[(1, 22, 99)]),
        ];

        let ds = aggregate_by_region(&rows, "Italy", 15);
        let mut locations: Vec<&str> = ds.series.iter().map(|s| s.location.as_str()).collect();
        locations.sort();
        assert_eq!(locations, vec!["North", "South"]);

        let south = ds.series.iter().find(|s| s.location == "South").unwrap();
        assert_eq!(south.points[1].delta, 15);
    }

    #[test]
    fn refiltering_with_zero_threshold_preserves_points() {
        let rows = vec![row("Italy", None, &[(1, 22, 16), (1, 23, 20), (1, 24, 28)])];
        let ds = aggregate_by_country(&rows, 15);
        let original = &ds.series[0];

        let points: Vec<(NaiveDate, u64)> =
            original.points.iter().map(|p| (p.date, p.confirmed)).collect();
        let refiltered = filter_by_threshold(&original.location, &points, 0).unwrap();

        assert_eq!(refiltered.points.len(), original.points.len());
        let dates: Vec<NaiveDate> = refiltered.points.iter().map(|p| p.date).collect();
        let expected: Vec<NaiveDate> = original.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn location_list_is_sorted_descending_by_count() {
        let rows = vec![
            row("France", None, &[(1, 22, 20), (1, 23, 40)]),
            row("Italy", None, &[(1, 22, 30), (1, 23, 90)]),
        ];

        let ds = aggregate_by_country(&rows, 15);
        let order: Vec<&str> = ds.locations.iter().map(|l| l.location.as_str()).collect();
        assert_eq!(order, vec!["Italy", "France"]);
        assert_eq!(ds.locations[0].max_confirmed, 90);
        assert_eq!(ds.locations[0].start_date, date(1, 22));
    }

    #[test]
    fn visibility_operations_stay_consistent() {
        let rows = vec![
            row("France", None, &[(1, 22, 20)]),
            row("Italy", None, &[(1, 22, 30)]),
        ];
        let mut ds = aggregate_by_country(&rows, 15);

        ds.set_visible_locations(&["Italy"]);
        assert_eq!(ds.visible_series().count(), 1);
        assert!(ds.locations.iter().any(|l| l.location == "Italy" && l.visible));
        assert!(ds.locations.iter().any(|l| l.location == "France" && !l.visible));

        ds.set_visibility_for_location("France", true);
        assert_eq!(ds.visible_series().count(), 2);

        ds.set_visibility_for_all(false);
        assert_eq!(ds.visible_series().count(), 0);
        assert!(ds.locations.iter().all(|l| !l.visible));
    }
}
