//! scopesync command-line tool
//!
//! Usage:
//!   scopesync replay --snapshot base.json batch1.json batch2.json -o out.json
//!   scopesync check batch.json

use anyhow::Result;
use clap::{Parser, Subcommand};
use scopesync_cli::{check, load_registry, read_changes, replay, write_snapshot};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "scopesync")]
#[command(about = "Inspect and replay scopesync change-sets")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply change-sets on top of a snapshot and print the resulting snapshot
    Replay {
        /// Type registry JSON (defaults to the diagram types)
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// Snapshot to start from
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Change-set files, applied in order
        changes: Vec<PathBuf>,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the dependency order of a change-set
    Check {
        /// Change-set file
        changes: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Replay {
            types,
            snapshot,
            changes,
            output,
        } => {
            let registry = load_registry(types.as_deref())?;
            let scope = replay(registry, snapshot.as_deref(), &changes)?;
            info!("Replayed {} change-sets, {} objects", changes.len(), scope.len());
            write_snapshot(&scope, output.as_deref())?;
        }
        Command::Check { changes: path } => {
            let changes = read_changes(&path)?;
            let report = check(&changes)?;
            if !report.creates_in_order(&changes) {
                warn!("{} lists creates out of dependency order", path.display());
            }
            print!("{report}");
        }
    }
    Ok(())
}
