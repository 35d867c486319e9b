use serde::{Deserialize, Serialize};

/// A single logged exercise event. The timestamp is kept as the literal text
/// it arrived with; bucketing works on its `YYYY-MM-DD` / `YYYY-MM-DDTHH`
/// prefixes, so all timestamps are assumed to be in one reference timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub timestamp: String,
    pub repetitions: u64,
    pub source: String,
}

/// Parses a raw delimited log into a chronologically ascending entry
/// sequence. The first line is a header and is always discarded. Rows that
/// fail validation are dropped, not surfaced: partial data beats strict
/// validation here.
pub fn parse_log(raw: &str) -> Vec<Entry> {
    let entries = raw.lines().skip(1).filter_map(parse_row).collect();
    normalize_entries(entries)
}

/// Validity sweep + defensive stable sort. Store callers promise ascending
/// order already, but the engine does not rely on it.
pub fn normalize_entries(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.retain(|e| !e.timestamp.is_empty());
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    entries
}

fn parse_row(line: &str) -> Option<Entry> {
    let mut fields = line.splitn(3, ',');
    let timestamp = fields.next()?.trim();
    if timestamp.is_empty() {
        return None;
    }
    let repetitions = parse_repetitions(fields.next()?)?;
    let source = fields.next().unwrap_or("").trim().to_string();
    Some(Entry {
        timestamp: timestamp.to_string(),
        repetitions,
        source,
    })
}

fn parse_repetitions(field: &str) -> Option<u64> {
    match field.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v as u64),
        _ => None,
    }
}
