//! `dirmirror profile list|show|add`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dirmirror_core::{profile, types::DeletePolicy, SyncProfile};

use super::sync::load_profile;
use crate::CompareModeArg;

/// Manage saved profiles under `~/.dirmirror/profiles/`.
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List saved profile names.
    List,

    /// Print a profile as YAML.
    Show {
        /// Profile name or path to a profile file.
        name: String,
    },

    /// Save a new profile (overwrites an existing one with the same name).
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Profile name (e.g. "photos", "backup").
    pub name: String,

    pub source: PathBuf,

    pub destination: PathBuf,

    /// Regex matched from the start of each relative path. Repeatable.
    #[arg(long = "exclude", short = 'x', value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Keep destination entries that have no source counterpart.
    #[arg(long)]
    pub no_delete: bool,

    /// content | timestamp. Defaults to content.
    #[arg(long, value_name = "MODE")]
    pub compare: Option<CompareModeArg>,

    /// Abort on the first failed deletion instead of logging it.
    #[arg(long)]
    pub strict_delete: bool,
}

pub fn run(cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::List => list(),
        ProfileCommand::Show { name } => show(&name),
        ProfileCommand::Add(args) => add(args),
    }
}

fn list() -> Result<()> {
    let names = profile::list_profile_names().context("failed to list profiles")?;

    if names.is_empty() {
        println!("No profiles saved.");
        println!("Run: dirmirror profile add <name> <source> <destination>");
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn show(name: &str) -> Result<()> {
    let profile = load_profile(name)?;
    print!("{}", serde_yaml::to_string(&profile)?);
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let mut profile = SyncProfile::new(args.source, args.destination);
    profile.exclude = args.exclude;
    profile.delete = !args.no_delete;
    if let Some(mode) = args.compare {
        profile.compare = mode.into();
    }
    if args.strict_delete {
        profile.delete_policy = DeletePolicy::Strict;
    }

    profile::save_named(&args.name, &profile)
        .with_context(|| format!("failed to save profile '{}'", args.name))?;
    println!(
        "✓ saved profile '{}' ({} -> {})",
        args.name,
        profile.source.display(),
        profile.destination.display()
    );
    Ok(())
}
