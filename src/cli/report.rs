use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::{
    stats::{build_stats, entry::normalize_entries, Entry, Granularity, StatsReport},
    store::entry_store::{EntryStore, FileEntryStore},
    utils::time::is_canonical_filter_date,
};

use super::{create_application_default_path, Args};

#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[arg(
        long,
        help = "Inclusive start of the range as a YYYY-MM-DD date. Unbounded when absent"
    )]
    from: Option<String>,
    #[arg(
        long,
        help = "Inclusive end of the range as a YYYY-MM-DD date. Unbounded when absent"
    )]
    to: Option<String>,
    #[arg(long, help = "Print the full report as json instead of a table")]
    json: bool,
    #[arg(long, help = "List the filtered entries under the series")]
    entries: bool,
}

/// Command to process `stats`. Loads the stored entries, runs one aggregation
/// pass over the requested range, and renders the result.
pub async fn process_stats_command(
    StatsCommand {
        from,
        to,
        json,
        entries: show_entries,
    }: StatsCommand,
) -> Result<()> {
    let from = checked_filter_date(from)?;
    let to = checked_filter_date(to)?;

    let store = FileEntryStore::new(create_application_default_path()?.join("entries"))?;
    let stored: Vec<Entry> = store.list_all().await?.into_iter().map(Entry::from).collect();
    // the store promises ascending order, but the engine does not rely on it
    let report = build_stats(normalize_entries(stored), from.as_deref(), to.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, show_entries));
    }
    Ok(())
}

fn checked_filter_date(value: Option<String>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if !is_canonical_filter_date(&value) {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value}, expected YYYY-MM-DD"),
            )
            .into());
    }
    Ok(Some(value))
}

/// Renders a report as a text table. An empty report is a legitimate
/// "no data in range" state, not an error.
pub fn render_report(report: &StatsReport, show_entries: bool) -> String {
    let mut out = String::new();

    if report.meta.entries == 0 {
        out.push_str("No entries in range\n");
        return out;
    }

    out.push_str(&format!(
        "{} reps over {} days ({} entries, {})\n\n",
        report.meta.total, report.meta.days, report.meta.entries, report.meta.granularity
    ));

    for bucket in &report.series {
        match report.meta.granularity {
            Granularity::Daily => {
                out.push_str(&format!("{}\t{}\n", bucket.label, bucket.total));
            }
            Granularity::Hourly => {
                out.push_str(&format!(
                    "{}\t{}\t{}\n",
                    bucket.label, bucket.total, bucket.day_integral
                ));
            }
        }
    }

    if show_entries {
        out.push('\n');
        for entry in &report.entries {
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                entry.timestamp, entry.repetitions, entry.source
            ));
        }
    }

    out
}
