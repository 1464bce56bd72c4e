//! dirmirror: one-way directory mirroring.
//!
//! # Usage
//!
//! ```text
//! dirmirror sync <src> <dst> [--exclude <regex>]... [--no-delete]
//!                [--compare content|timestamp] [--strict-delete] [--dry-run] [--json]
//! dirmirror sync --profile <name|path> [--dry-run] [--json]
//! dirmirror diff <src> <dst> [--exclude <regex>]... [--compare ...] [--json]
//! dirmirror profile list|show|add
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, profile::ProfileCommand, sync::SyncArgs};
use dirmirror_core::types::CompareMode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dirmirror",
    version,
    about = "Mirror a source directory tree onto a destination",
    long_about = None,
)]
struct Cli {
    /// Log every action at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Make the destination mirror the source.
    Sync(SyncArgs),

    /// Show how two trees differ without touching either.
    Diff(DiffArgs),

    /// Manage saved sync profiles.
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared CompareMode argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `CompareMode` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareModeArg(pub CompareMode);

impl FromStr for CompareModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" => Ok(Self(CompareMode::Content)),
            "timestamp" | "mtime" => Ok(Self(CompareMode::Timestamp)),
            other => Err(format!(
                "unknown compare mode '{other}'; expected: content, timestamp"
            )),
        }
    }
}

impl fmt::Display for CompareModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<CompareModeArg> for CompareMode {
    fn from(c: CompareModeArg) -> Self {
        c.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Profile { command } => commands::profile::run(command),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
