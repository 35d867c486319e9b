use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use super::entry::Entry;

/// Ranges spanning this many distinct days or more are shown daily.
const HOURLY_DAY_LIMIT: usize = 7;

/// Time resolution of the output series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Hourly,
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Hourly => write!(f, "hourly"),
        }
    }
}

/// One aggregated point of the output series. `day_integral` is the running
/// sum of totals since the most recent calendar-date boundary; in daily mode
/// it always equals `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub label: String,
    pub total: u64,
    pub day_integral: u64,
}

/// `YYYY-MM-DD` prefix of a timestamp. Zero-padded ISO-like labels sort
/// lexicographically in chronological order, so buckets and filters compare
/// these as plain strings.
pub fn date_prefix(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// `YYYY-MM-DDTHH` prefix of a timestamp.
pub fn hour_prefix(timestamp: &str) -> &str {
    timestamp.get(..13).unwrap_or(timestamp)
}

/// Restricts entries to an inclusive `[from, to]` date window. Absent bounds
/// impose no constraint. Does not re-sort.
pub fn filter_range(mut entries: Vec<Entry>, from: Option<&str>, to: Option<&str>) -> Vec<Entry> {
    entries.retain(|e| {
        let date = date_prefix(&e.timestamp);
        from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
    });
    entries
}

/// Hourly buckets are only readable over a short span; at a week or more the
/// engine coarsens to daily. Zero entries defaults to daily with an empty
/// series.
pub fn select_granularity(entries: &[Entry]) -> Granularity {
    let distinct_days = entries
        .iter()
        .map(|e| date_prefix(&e.timestamp))
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    if distinct_days > 0 && distinct_days < HOURLY_DAY_LIMIT {
        Granularity::Hourly
    } else {
        Granularity::Daily
    }
}

/// Groups entries by calendar date and sums repetitions. A full day always
/// closes its own integral, so `day_integral == total`.
pub fn aggregate_daily(entries: &[Entry]) -> Vec<Bucket> {
    let mut totals = BTreeMap::<&str, u64>::new();
    for e in entries {
        *totals.entry(date_prefix(&e.timestamp)).or_default() += e.repetitions;
    }
    totals
        .into_iter()
        .map(|(label, total)| Bucket {
            label: label.to_string(),
            total,
            day_integral: total,
        })
        .collect()
}

/// Groups entries by date+hour and sums repetitions, then walks the sorted
/// buckets once, resetting the running total at every date boundary. Labels
/// are truncated to the top of the hour (`YYYY-MM-DDTHH:00`).
pub fn aggregate_hourly(entries: &[Entry]) -> Vec<Bucket> {
    let mut totals = BTreeMap::<&str, u64>::new();
    for e in entries {
        *totals.entry(hour_prefix(&e.timestamp)).or_default() += e.repetitions;
    }

    let mut buckets = Vec::with_capacity(totals.len());
    let mut running_total = 0u64;
    let mut previous_date: Option<&str> = None;
    for (hour, total) in totals {
        let date = date_prefix(hour);
        if previous_date != Some(date) {
            running_total = 0;
        }
        running_total += total;
        previous_date = Some(date);
        buckets.push(Bucket {
            label: format!("{hour}:00"),
            total,
            day_integral: running_total,
        });
    }
    buckets
}
