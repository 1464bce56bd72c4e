//! Tree differ: scan two roots into path sets and split them three ways.
//!
//! Read-only. Both trees are filtered through the same [`ExcludeSet`].

use std::path::{Component, Path};

use walkdir::WalkDir;

use dirmirror_core::types::{Partition, PathSet};

use crate::{exclude::ExcludeSet, SyncError};

/// Scan both roots and partition their entries into source-only,
/// destination-only and common relative paths.
///
/// Fails with [`SyncError::InvalidArgument`] unless both roots are
/// existing directories. Walk errors under the source root set
/// [`Partition::source_incomplete`].
pub fn compare_directories(
    src_root: &Path,
    dst_root: &Path,
    exclude: &ExcludeSet,
) -> Result<Partition, SyncError> {
    ensure_dir(src_root)?;
    ensure_dir(dst_root)?;

    let (src, src_errors) = walk(src_root, exclude);
    let (dst, _) = walk(dst_root, exclude);
    let mut partition = Partition::from_sets(src, dst);
    partition.source_incomplete = src_errors > 0;
    if partition.source_incomplete {
        tracing::warn!(
            "{src_errors} unreadable entries under {}; source listing is incomplete",
            src_root.display()
        );
    }

    tracing::debug!(
        "compared {} and {}: {} source-only, {} destination-only, {} common",
        src_root.display(),
        dst_root.display(),
        partition.source_only.len(),
        partition.dest_only.len(),
        partition.common.len()
    );
    Ok(partition)
}

/// Every file, directory and symlink below `root` (the root itself
/// excluded), as slash-normalized relative paths. Symlinks are listed but
/// never followed.
///
/// Entries that cannot be read mid-walk, and names that are not valid
/// UTF-8, are logged and skipped.
pub fn scan_tree(root: &Path, exclude: &ExcludeSet) -> Result<PathSet, SyncError> {
    ensure_dir(root)?;
    Ok(walk(root, exclude).0)
}

/// Walk `root`, returning the listed paths and the number of walk errors.
fn walk(root: &Path, exclude: &ExcludeSet) -> (PathSet, usize) {
    let mut set = PathSet::new();
    let mut excluded = 0usize;
    let mut errors = 0usize;
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {err}", root.display());
                errors += 1;
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(rel) = to_slash(relative) else {
            tracing::warn!("skipping non UTF-8 path: {}", entry.path().display());
            continue;
        };
        if exclude.is_excluded(&rel) {
            excluded += 1;
            continue;
        }
        set.insert(rel);
    }

    if excluded > 0 {
        tracing::debug!("{}: {excluded} entries excluded", root.display());
    }
    (set, errors)
}

/// Join the normal components of `relative` with `/`.
pub(crate) fn to_slash(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    if path.is_dir() {
        Ok(())
    } else if path.exists() {
        Err(SyncError::InvalidArgument {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        })
    } else {
        Err(SyncError::InvalidArgument {
            path: path.to_path_buf(),
            reason: "directory does not exist".to_string(),
        })
    }
}
