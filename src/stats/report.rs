use serde::Serialize;
use tracing::instrument;

use super::aggregate::{
    aggregate_daily, aggregate_hourly, filter_range, select_granularity, Bucket, Granularity,
};
use super::entry::Entry;

/// Summary of one stats query: the echoed filter bounds and the counts the
/// daily aggregation is the canonical source of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsMeta {
    pub from: Option<String>,
    pub to: Option<String>,
    pub entries: usize,
    pub days: usize,
    pub total: u64,
    pub granularity: Granularity,
}

/// The engine's complete output for one query. A value, not a live object:
/// nothing here is mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub meta: StatsMeta,
    /// Bucketed series at the chosen granularity.
    pub series: Vec<Bucket>,
    /// Daily aggregation, always computed regardless of chosen granularity.
    pub daily: Vec<Bucket>,
    /// The filtered but unaggregated entries, for detail views.
    pub entries: Vec<Entry>,
}

/// Filters, aggregates, and packages one stats query. Pure and idempotent:
/// identical inputs always produce an identical report.
#[instrument(skip(entries))]
pub fn build_stats(entries: Vec<Entry>, from: Option<&str>, to: Option<&str>) -> StatsReport {
    let filtered = filter_range(entries, from, to);
    let daily = aggregate_daily(&filtered);
    let granularity = select_granularity(&filtered);
    let series = match granularity {
        Granularity::Daily => daily.clone(),
        Granularity::Hourly => aggregate_hourly(&filtered),
    };

    StatsReport {
        meta: StatsMeta {
            from: from.map(str::to_owned),
            to: to.map(str::to_owned),
            entries: filtered.len(),
            days: daily.len(),
            total: daily.iter().map(|b| b.total).sum(),
            granularity,
        },
        series,
        daily,
        entries: filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::build_stats;
    use crate::stats::aggregate::Granularity;
    use crate::stats::entry::{parse_log, Entry};

    fn entry(timestamp: &str, repetitions: u64) -> Entry {
        Entry {
            timestamp: timestamp.into(),
            repetitions,
            source: "test".into(),
        }
    }

    #[test]
    fn short_range_reports_hourly() {
        let entries = vec![
            entry("2026-02-10T10:05:00", 10),
            entry("2026-02-10T10:45:00", 5),
            entry("2026-02-11T09:10:00", 12),
        ];
        let report = build_stats(entries, None, None);
        assert_eq!(report.meta.granularity, Granularity::Hourly);
        assert_eq!(report.meta.total, 27);
        assert_eq!(report.meta.days, 2);
        assert_eq!(report.meta.entries, 3);
    }

    #[test]
    fn week_long_range_reports_daily() {
        let entries: Vec<_> = (10..17)
            .map(|d| entry(&format!("2026-02-{d}T10:00:00"), 10))
            .collect();
        let report = build_stats(entries, None, None);
        assert_eq!(report.meta.granularity, Granularity::Daily);
        assert_eq!(report.series.len(), 7);
        assert_eq!(report.series, report.daily);
        assert_eq!(report.meta.total, 70);
    }

    #[test]
    fn invalid_raw_rows_reach_no_count() {
        let report = build_stats(
            parse_log("timestamp,repetitions,source\nbad-timestamp,,\n"),
            None,
            None,
        );
        assert_eq!(report.meta.entries, 0);
        assert_eq!(report.meta.total, 0);
        assert_eq!(report.meta.days, 0);
        assert_eq!(report.meta.granularity, Granularity::Daily);
        assert!(report.series.is_empty());
        assert!(report.entries.is_empty());
    }

    #[test]
    fn bounds_are_echoed_verbatim() {
        let report = build_stats(vec![entry("2026-02-10T10:00:00", 1)], None, None);
        assert_eq!(report.meta.from, None);
        assert_eq!(report.meta.to, None);

        let report = build_stats(
            vec![entry("2026-02-10T10:00:00", 1)],
            Some("2026-02-01"),
            Some("2026-02-28"),
        );
        assert_eq!(report.meta.from.as_deref(), Some("2026-02-01"));
        assert_eq!(report.meta.to.as_deref(), Some("2026-02-28"));
    }

    #[test]
    fn series_total_matches_meta_total() {
        let entries = vec![
            entry("2026-02-10T10:05:00", 10),
            entry("2026-02-10T11:45:00", 5),
            entry("2026-02-12T09:10:00", 12),
        ];
        let report = build_stats(entries, None, None);
        let series_sum: u64 = report.series.iter().map(|b| b.total).sum();
        let daily_sum: u64 = report.daily.iter().map(|b| b.total).sum();
        assert_eq!(series_sum, report.meta.total);
        assert_eq!(daily_sum, report.meta.total);
    }

    #[test]
    fn identical_inputs_produce_identical_reports() {
        let entries = vec![
            entry("2026-02-10T10:05:00", 10),
            entry("2026-02-11T09:10:00", 3),
        ];
        let a = build_stats(entries.clone(), Some("2026-02-10"), None);
        let b = build_stats(entries, Some("2026-02-10"), None);
        assert_eq!(a, b);
    }

    #[test]
    fn report_serializes_with_expected_field_names() {
        let report = build_stats(vec![entry("2026-02-10T10:05:00", 10)], None, None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["meta"]["granularity"], "hourly");
        assert!(json["meta"]["from"].is_null());
        assert_eq!(json["series"][0]["dayIntegral"], 10);
        assert_eq!(json["series"][0]["label"], "2026-02-10T10:00");
    }
}
