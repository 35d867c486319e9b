pub mod report;

use std::{env, path::PathBuf};

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use report::{process_stats_command, StatsCommand};
use tokio::io;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    stats::entry::parse_log,
    store::{
        entry_store::{EntryStore, FileEntryStore},
        ChangeNotifier, LogNotifier,
    },
    utils::{
        logging::enable_logging,
        time::{is_canonical_timestamp, timestamp_now},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Replog", version, long_about = None)]
#[command(about = "Personal exercise log with adaptive statistics", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record a new entry")]
    Add {
        #[arg(help = "Repetition count")]
        reps: u64,
        #[arg(
            long,
            help = "Timestamp of the entry, for example 2026-02-10T10:05:00. Defaults to now"
        )]
        at: Option<String>,
        #[arg(long, default_value = "cli", help = "Provenance tag carried with the entry")]
        source: String,
    },
    #[command(about = "Change a recorded entry")]
    Edit {
        #[arg(help = "Identifier printed when the entry was recorded")]
        id: u64,
        #[arg(long, help = "New repetition count")]
        reps: Option<u64>,
        #[arg(long, help = "New timestamp")]
        at: Option<String>,
        #[arg(long, help = "New provenance tag")]
        source: Option<String>,
    },
    #[command(about = "Delete a recorded entry")]
    Remove {
        #[arg(help = "Identifier printed when the entry was recorded")]
        id: u64,
    },
    #[command(
        about = "Import entries from a delimited log with a timestamp,repetitions,source header"
    )]
    Import {
        #[arg(help = "Path of the log file")]
        file: PathBuf,
    },
    #[command(about = "Display totals over time at adaptive resolution")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    match args.commands {
        Commands::Add { reps, at, source } => process_add_command(reps, at, source).await,
        Commands::Edit {
            id,
            reps,
            at,
            source,
        } => process_edit_command(id, reps, at, source).await,
        Commands::Remove { id } => process_remove_command(id).await,
        Commands::Import { file } => process_import_command(file).await,
        Commands::Stats { command } => process_stats_command(command).await,
    }
}

fn open_default_store() -> Result<FileEntryStore> {
    Ok(FileEntryStore::new(
        create_application_default_path()?.join("entries"),
    )?)
}

/// Rejects timestamps the bucketing prefixes would misinterpret.
fn checked_timestamp(at: Option<String>) -> Result<String> {
    let Some(at) = at else {
        return Ok(timestamp_now());
    };
    if !is_canonical_timestamp(&at) {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate timestamp {at}, expected YYYY-MM-DDTHH:MM:SS"),
            )
            .into());
    }
    Ok(at)
}

async fn process_add_command(reps: u64, at: Option<String>, source: String) -> Result<()> {
    let timestamp = checked_timestamp(at)?;
    let store = open_default_store()?;
    let entity = store.create(timestamp, reps, source).await?;
    LogNotifier.data_changed();
    println!(
        "Recorded entry {} at {} ({} reps)",
        entity.id, entity.timestamp, entity.repetitions
    );
    Ok(())
}

async fn process_edit_command(
    id: u64,
    reps: Option<u64>,
    at: Option<String>,
    source: Option<String>,
) -> Result<()> {
    let store = open_default_store()?;
    let Some(mut entity) = store.list_all().await?.into_iter().find(|e| e.id == id) else {
        bail!("No entry with id {id}");
    };
    if let Some(reps) = reps {
        entity.repetitions = reps;
    }
    if let Some(at) = at {
        entity.timestamp = checked_timestamp(Some(at))?;
    }
    if let Some(source) = source {
        entity.source = source;
    }
    store.update(entity).await?;
    LogNotifier.data_changed();
    println!("Updated entry {id}");
    Ok(())
}

async fn process_remove_command(id: u64) -> Result<()> {
    let store = open_default_store()?;
    if !store.delete(id).await? {
        bail!("No entry with id {id}");
    }
    LogNotifier.data_changed();
    println!("Removed entry {id}");
    Ok(())
}

async fn process_import_command(file: PathBuf) -> Result<()> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let entries = parse_log(&raw);
    info!("Parsed {} valid rows from {file:?}", entries.len());

    let store = open_default_store()?;
    let count = entries.len();
    for entry in entries {
        store
            .create(entry.timestamp, entry.repetitions, entry.source)
            .await?;
    }
    if count > 0 {
        LogNotifier.data_changed();
    }
    println!("Imported {count} entries from {}", file.display());
    Ok(())
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("replog");
            path
        }
        #[cfg(target_os = "linux")]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("replog");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
