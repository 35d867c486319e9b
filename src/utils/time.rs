use chrono::{DateTime, Local, NaiveDate};

/// This is the standard way of converting a moment to an entry timestamp in
/// replog. Buckets are derived from the textual prefixes of this format.
pub fn timestamp_for<Tz: chrono::TimeZone>(moment: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    moment.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Timestamp for the local current moment.
pub fn timestamp_now() -> String {
    timestamp_for(Local::now())
}

/// Checks that a user-supplied entry timestamp matches the exact format new
/// entries are stamped with. Parsing alone is not enough: chrono accepts
/// non-padded fields, which would corrupt the textual bucket prefixes and
/// their lexicographic order, so the parsed value must format back to the
/// input.
pub fn is_canonical_timestamp(value: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .is_ok_and(|parsed| timestamp_for_naive(parsed) == value)
}

/// Checks that a filter bound is a zero-padded `YYYY-MM-DD` calendar date.
pub fn is_canonical_filter_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .is_ok_and(|parsed| parsed.format("%Y-%m-%d").to_string() == value)
}

fn timestamp_for_naive(moment: chrono::NaiveDateTime) -> String {
    moment.format("%Y-%m-%dT%H:%M:%S").to_string()
}
