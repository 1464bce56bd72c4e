//! `dirmirror sync`: mirror a source tree onto a destination.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use dirmirror_core::{profile, types::DeletePolicy, SyncProfile};
use dirmirror_sync::pipeline::{self, PipelineOutcome};

use crate::CompareModeArg;

/// Arguments for `dirmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Source directory (omit when using `--profile`).
    pub source: Option<PathBuf>,

    /// Destination directory (omit when using `--profile`).
    pub destination: Option<PathBuf>,

    /// Saved profile name, or path to a profile YAML file.
    #[arg(long, short = 'p', conflicts_with_all = ["source", "destination"])]
    pub profile: Option<String>,

    /// Regex matched from the start of each relative path. Repeatable.
    #[arg(long = "exclude", short = 'x', value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Keep destination entries that have no source counterpart.
    #[arg(long)]
    pub no_delete: bool,

    /// How files present on both sides are compared: content | timestamp.
    #[arg(long, value_name = "MODE")]
    pub compare: Option<CompareModeArg>,

    /// Abort on the first failed deletion instead of logging it.
    #[arg(long)]
    pub strict_delete: bool,

    /// Show what would change without touching the destination.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let profile = self.resolve_profile()?;
        let outcome = pipeline::run_profile(&profile, self.dry_run).with_context(|| {
            format!(
                "sync failed for {} -> {}",
                profile.source.display(),
                profile.destination.display()
            )
        })?;

        let report = SyncReport::new(&profile, outcome);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }

    /// Build the profile to run: a saved one when `--profile` is given,
    /// otherwise the positional pair. Flags layer on top either way.
    fn resolve_profile(&self) -> Result<SyncProfile> {
        let mut profile = match (&self.profile, &self.source, &self.destination) {
            (Some(name_or_path), _, _) => load_profile(name_or_path)?,
            (None, Some(src), Some(dst)) => SyncProfile::new(src.clone(), dst.clone()),
            _ => bail!("provide <SOURCE> <DESTINATION> or --profile <NAME>"),
        };

        profile.exclude.extend(self.exclude.iter().cloned());
        if self.no_delete {
            profile.delete = false;
        }
        if let Some(mode) = self.compare {
            profile.compare = mode.into();
        }
        if self.strict_delete {
            profile.delete_policy = DeletePolicy::Strict;
        }
        tracing::debug!(
            "resolved profile: compare={}, delete={}, delete_policy={}, {} exclude(s)",
            profile.compare,
            profile.delete,
            profile.delete_policy,
            profile.exclude.len()
        );
        Ok(profile)
    }
}

/// A value that names an existing file or looks like a path is loaded from
/// disk; anything else is a profile name under `~/.dirmirror/profiles/`.
pub fn load_profile(name_or_path: &str) -> Result<SyncProfile> {
    let as_path = Path::new(name_or_path);
    let looks_like_path = as_path.is_file()
        || name_or_path.ends_with(".yaml")
        || name_or_path.ends_with(".yml")
        || name_or_path.contains(std::path::MAIN_SEPARATOR);
    if looks_like_path {
        profile::load_profile_at(as_path)
            .with_context(|| format!("failed to load profile from {name_or_path}"))
    } else {
        profile::load_named(name_or_path).with_context(|| format!("failed to load profile '{name_or_path}'"))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SyncReport {
    dry_run: bool,
    source: PathBuf,
    destination: PathBuf,
    created: Vec<PathBuf>,
    modified: Vec<PathBuf>,
    deleted: Vec<PathBuf>,
}

impl SyncReport {
    fn new(profile: &SyncProfile, outcome: PipelineOutcome) -> Self {
        let (dry_run, created, modified, deleted) = match outcome {
            PipelineOutcome::Planned(p) => (true, p.create, p.modify, p.delete),
            PipelineOutcome::Applied(r) => (false, r.created, r.modified, r.deleted),
        };
        Self {
            dry_run,
            source: profile.source.clone(),
            destination: profile.destination.clone(),
            created,
            modified,
            deleted,
        }
    }

    fn total(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let pair = format!(
        "{} -> {}",
        report.source.display(),
        report.destination.display()
    );

    if report.total() == 0 {
        println!("{prefix}✓ {pair}: already in sync");
        return;
    }

    let verb = if report.dry_run { "would sync" } else { "synced" };
    println!(
        "{prefix}✓ {verb} {pair} ({} created, {} modified, {} deleted)",
        report.created.len(),
        report.modified.len(),
        report.deleted.len()
    );
    for path in &report.created {
        println!("  +  {}", path.display());
    }
    for path in &report.modified {
        println!("  ~  {}", path.display());
    }
    for path in &report.deleted {
        println!("  -  {}", path.display());
    }
}
