//! Mirror pass orchestration.
//!
//! ## `sync_with`: phase order
//!
//! 1. Compile excludes and partition both trees (fails before any mutation
//!    if a root is not a directory).
//! 2. Reconcile common entries: ensure directories, re-copy changed files.
//!    A type mismatch counts as a change: a file or link in place of a
//!    source directory becomes a real directory, and a directory in place
//!    of a source file or link is replaced by the copy.
//! 3. Materialize source-only entries: create directories, copy files.
//! 4. Prune destination-only entries, only when `delete` is set and the
//!    source tree was listed without errors.
//!
//! Phases run strictly in order, one entry at a time. A copy failure aborts
//! the pass; whatever was already applied stays applied.

use std::fs;
use std::path::Path;

use dirmirror_core::types::{CompareMode, DeletePolicy, SyncOptions, SyncResult};

use crate::compare::has_changed;
use crate::copier::{Copier, DefaultCopier};
use crate::differ::compare_directories;
use crate::exclude::ExcludeSet;
use crate::fs_ops::{create_directory, delete_entry, replace_with_directory, try_delete_entry};
use crate::SyncError;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Mirror `src_root` onto `dst_root` with the default copier, content
/// comparison, best-effort deletion and no excludes.
pub fn sync(src_root: &Path, dst_root: &Path, delete: bool) -> Result<SyncResult, SyncError> {
    let options = SyncOptions {
        delete,
        ..SyncOptions::default()
    };
    sync_with(src_root, dst_root, &options, &DefaultCopier)
}

/// Mirror `src_root` onto `dst_root`.
///
/// Returns the destination paths created, modified and deleted, in the order
/// the actions were applied. With `options.delete == false` the prune phase
/// is skipped but the created / modified lists are still returned.
///
/// Under [`DeletePolicy::BestEffort`] `deleted` records every
/// destination-only path the pass attempted to remove, whether or not the
/// removal succeeded.
pub fn sync_with<C>(
    src_root: &Path,
    dst_root: &Path,
    options: &SyncOptions,
    copier: &C,
) -> Result<SyncResult, SyncError>
where
    C: Copier + ?Sized,
{
    let exclude = ExcludeSet::new(&options.exclude)?;
    let partition = compare_directories(src_root, dst_root, &exclude)?;
    let mut result = SyncResult::default();

    // Phase 1: common entries.
    for rel in &partition.common {
        let src = src_root.join(rel);
        let dst = dst_root.join(rel);
        if !needs_update(&src, &dst, options.compare) {
            tracing::debug!("unchanged: {}", dst.display());
            continue;
        }
        let copied = if is_real_dir(&src) {
            replace_with_directory(&dst)?
        } else {
            copier.copy(&src, &dst)?
        };
        tracing::info!("modified: {}", copied.display());
        result.modified.push(copied);
    }

    // Phase 2: source-only entries. Sorted order puts parents first.
    for rel in &partition.source_only {
        let src = src_root.join(rel);
        let dst = dst_root.join(rel);
        let created = if is_real_dir(&src) {
            create_directory(&dst)?
        } else {
            copier.copy(&src, &dst)?
        };
        tracing::info!("created: {}", created.display());
        result.created.push(created);
    }

    // Phase 3: destination-only entries.
    if options.delete && partition.source_incomplete {
        tracing::warn!(
            "source listing of {} was incomplete; skipping deletion of {} entries",
            src_root.display(),
            partition.dest_only.len()
        );
    } else if options.delete {
        for rel in &partition.dest_only {
            let dst = dst_root.join(rel);
            if !parents_are_real_dirs(dst_root, rel) {
                // Gone with its parent, or only reachable through a link.
                tracing::debug!("already removed: {}", dst.display());
                result.deleted.push(dst);
                continue;
            }
            match options.delete_policy {
                DeletePolicy::Strict => try_delete_entry(&dst)?,
                DeletePolicy::BestEffort => {
                    if let Err(err) = delete_entry(&dst) {
                        tracing::warn!("ignoring delete failure: {err}");
                    }
                }
            }
            result.deleted.push(dst);
        }
    } else if !partition.dest_only.is_empty() {
        tracing::debug!(
            "deletion disabled; keeping {} destination-only entries",
            partition.dest_only.len()
        );
    }

    tracing::info!(
        "synced {} -> {} ({} created, {} modified, {} deleted)",
        src_root.display(),
        dst_root.display(),
        result.created.len(),
        result.modified.len(),
        result.deleted.len()
    );
    Ok(result)
}

/// A directory that is not reached through a symlink.
pub fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Every ancestor of `rel` below `root` is still a real directory.
fn parents_are_real_dirs(root: &Path, rel: &str) -> bool {
    let mut current = root.to_path_buf();
    let mut parts = rel.split('/').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            return true;
        }
        current.push(part);
        if !is_real_dir(&current) {
            return false;
        }
    }
    true
}

/// Whether the destination side of a common entry must be rewritten.
///
/// A source directory needs work only when something other than a real
/// directory sits at `dst`; anything else defers to [`has_changed`].
pub fn needs_update(src: &Path, dst: &Path, mode: CompareMode) -> bool {
    if is_real_dir(src) {
        return !is_real_dir(dst);
    }
    has_changed(src, dst, mode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn copies_new_file_and_reports_created() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "hi");

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert_eq!(result.created, vec![dst.path().join("a.txt")]);
        assert!(result.modified.is_empty());
        assert!(result.deleted.is_empty());
        assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "hi");
    }

    #[test]
    fn identical_trees_report_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "hi");
        touch(dst.path(), "a.txt", "hi");

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert!(result.is_empty(), "got {result:?}");
    }

    #[test]
    fn differing_content_is_modified() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "new");
        touch(dst.path(), "a.txt", "old");

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert_eq!(result.modified, vec![dst.path().join("a.txt")]);
        assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn new_directories_precede_their_files() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "docs/guide/intro.md", "x");

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert_eq!(
            result.created,
            vec![
                dst.path().join("docs"),
                dst.path().join("docs/guide"),
                dst.path().join("docs/guide/intro.md"),
            ]
        );
    }

    #[test]
    fn common_directory_is_not_reported() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("shared")).unwrap();
        fs::create_dir_all(dst.path().join("shared")).unwrap();

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn custom_copier_results_are_recorded() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "hi");
        let calls = RefCell::new(Vec::new());

        let recorder = |from: &Path, to: &Path| -> Result<PathBuf, SyncError> {
            calls.borrow_mut().push((from.to_path_buf(), to.to_path_buf()));
            Ok(PathBuf::from("remote://bucket/a.txt"))
        };
        let result =
            sync_with(src.path(), dst.path(), &SyncOptions::default(), &recorder).unwrap();

        assert_eq!(result.created, vec![PathBuf::from("remote://bucket/a.txt")]);
        assert_eq!(
            calls.into_inner(),
            vec![(src.path().join("a.txt"), dst.path().join("a.txt"))]
        );
        assert!(!dst.path().join("a.txt").exists(), "custom copier owns the write");
    }

    #[test]
    fn invalid_root_mutates_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "hi");
        let missing = dst.path().join("missing");

        let err = sync(src.path(), &missing, true).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn invalid_pattern_fails_before_mutation() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "a.txt", "hi");
        let options = SyncOptions {
            exclude: vec!["[".to_string()],
            ..SyncOptions::default()
        };

        let err = sync_with(src.path(), dst.path(), &options, &DefaultCopier).unwrap_err();
        assert!(matches!(err, SyncError::Pattern { .. }));
        assert!(!dst.path().join("a.txt").exists());
    }

    #[test]
    fn parents_are_real_dirs_checks_every_ancestor() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a/b/c.txt", "x");
        touch(tmp.path(), "file", "x");
        assert!(parents_are_real_dirs(tmp.path(), "top.txt"));
        assert!(parents_are_real_dirs(tmp.path(), "a/b/c.txt"));
        assert!(!parents_are_real_dirs(tmp.path(), "file/child"));
        assert!(!parents_are_real_dirs(tmp.path(), "missing/child"));
    }

    #[test]
    #[cfg(unix)]
    fn deletion_never_follows_a_replaced_parent_link() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "real/keep.txt", "k");
        std::os::unix::fs::symlink("real", src.path().join("x")).unwrap();
        touch(dst.path(), "real/keep.txt", "k");
        // Once dst/x becomes a link to dst/real, x/keep.txt resolves there.
        touch(dst.path(), "x/keep.txt", "old");

        let result = sync(src.path(), dst.path(), true).unwrap();
        assert!(result.deleted.contains(&dst.path().join("x/keep.txt")));
        assert!(dst.path().join("real/keep.txt").exists());
    }

    #[test]
    fn is_real_dir_rejects_files_and_missing() {
        let tmp = TempDir::new().unwrap();
        let f = touch(tmp.path(), "f", "x");
        assert!(is_real_dir(tmp.path()));
        assert!(!is_real_dir(&f));
        assert!(!is_real_dir(&tmp.path().join("missing")));
    }
}
