//! `dirmirror diff <src> <dst>`: show how two trees differ.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use dirmirror_core::types::CompareMode;
use dirmirror_sync::{compare_directories, needs_update, ExcludeSet};

use crate::CompareModeArg;

/// Arguments for `dirmirror diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    pub source: PathBuf,

    pub destination: PathBuf,

    /// Regex matched from the start of each relative path. Repeatable.
    #[arg(long = "exclude", short = 'x', value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// How files present on both sides are compared: content | timestamp.
    #[arg(long, value_name = "MODE", default_value = "content")]
    pub compare: CompareModeArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Default, Serialize)]
struct DiffReport {
    source_only: Vec<String>,
    dest_only: Vec<String>,
    changed: Vec<String>,
    unchanged: usize,
    source_incomplete: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let exclude = ExcludeSet::new(&self.exclude)?;
        let partition = compare_directories(&self.source, &self.destination, &exclude)
            .with_context(|| {
                format!(
                    "diff failed for {} -> {}",
                    self.source.display(),
                    self.destination.display()
                )
            })?;

        let mode: CompareMode = self.compare.into();
        let mut report = DiffReport {
            source_only: partition.source_only.into_iter().collect(),
            dest_only: partition.dest_only.into_iter().collect(),
            source_incomplete: partition.source_incomplete,
            ..DiffReport::default()
        };
        for rel in partition.common {
            let src = self.source.join(&rel);
            let dst = self.destination.join(&rel);
            if needs_update(&src, &dst, mode) {
                report.changed.push(rel);
            } else {
                report.unchanged += 1;
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &DiffReport) {
    if report.source_incomplete {
        println!(
            "{} source tree could not be fully read; sync will not delete",
            "!".yellow().bold()
        );
    }
    if report.source_only.is_empty() && report.dest_only.is_empty() && report.changed.is_empty() {
        println!("No differences ({} entries in common).", report.unchanged);
        return;
    }

    for rel in &report.source_only {
        println!("  {}  {rel}", "+".green().bold());
    }
    for rel in &report.changed {
        println!("  {}  {rel}", "~".yellow().bold());
    }
    for rel in &report.dest_only {
        println!("  {}  {rel}", "-".red().bold());
    }
    println!(
        "{} source only, {} changed, {} destination only, {} unchanged",
        report.source_only.len(),
        report.changed.len(),
        report.dest_only.len(),
        report.unchanged
    );
}
