//! Shared profile entrypoint used by the CLI.

use dirmirror_core::{
    types::{SyncPlan, SyncResult},
    SyncProfile,
};

use crate::{plan, sync_with, DefaultCopier, SyncError};

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// `dry_run`: the pass was only previewed.
    Planned(SyncPlan),
    /// The pass was applied with the default copier.
    Applied(SyncResult),
}

/// Run one profile, either previewing or applying it.
pub fn run_profile(profile: &SyncProfile, dry_run: bool) -> Result<PipelineOutcome, SyncError> {
    let options = profile.options();
    if dry_run {
        tracing::info!(
            "[dry-run] planning {} -> {}",
            profile.source.display(),
            profile.destination.display()
        );
        return plan(&profile.source, &profile.destination, &options).map(PipelineOutcome::Planned);
    }
    sync_with(&profile.source, &profile.destination, &options, &DefaultCopier)
        .map(PipelineOutcome::Applied)
}
