//! Command-line surface. Without a subcommand the TUI starts.

use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "soundloop", version, about = "Loop a short sound until it is time to stop")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List saved sounds.
    List,
    /// Show how much of the library quota is in use.
    Status,
    /// Copy an audio file into the library.
    Import {
        path: PathBuf,
        /// Display name; defaults to the title tag or file name.
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Record from the default microphone.
    Record {
        #[arg(short, long)]
        name: String,
        /// Stop after this many seconds (capped at the duration limit).
        #[arg(short, long)]
        seconds: Option<u32>,
    },
    Rename {
        id: String,
        name: String,
    },
    Delete {
        id: String,
    },
    /// Loop a saved sound. Press Enter to stop early.
    Play {
        id: String,
        #[command(flatten)]
        stop: StopArgs,
    },
    /// Drop index entries whose audio file is gone.
    Prune,
    /// Print the effective settings as TOML.
    Config,
}

#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct StopArgs {
    /// Stop after N minutes.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=1440))]
    pub minutes: Option<u64>,
    /// Stop at the next HH:MM local time.
    #[arg(long, value_parser = parse_clock_time)]
    pub until: Option<NaiveTime>,
}

pub fn parse_clock_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| format!("expected HH:MM (24h), got `{s}`"))
}
