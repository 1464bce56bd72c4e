//! The pluggable copy step.
//!
//! Any `Fn(&Path, &Path) -> Result<PathBuf, SyncError>` is a [`Copier`], so a
//! caller can swap in a recording, dry-run or remote implementation with a
//! closure. The returned path is what lands in the result lists.

use std::path::{Path, PathBuf};

use crate::{fs_ops, SyncError};

pub trait Copier {
    fn copy(&self, src: &Path, dst: &Path) -> Result<PathBuf, SyncError>;
}

/// Local copy via [`fs_ops::copy_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCopier;

impl Copier for DefaultCopier {
    fn copy(&self, src: &Path, dst: &Path) -> Result<PathBuf, SyncError> {
        fs_ops::copy_file(src, dst)
    }
}

impl<F> Copier for F
where
    F: Fn(&Path, &Path) -> Result<PathBuf, SyncError>,
{
    fn copy(&self, src: &Path, dst: &Path) -> Result<PathBuf, SyncError> {
        self(src, dst)
    }
}
