//! Read-only preview of a mirror pass.
//!
//! Uses the same differ and change-detection policy as
//! [`crate::sync_with`], so with the default copier the plan lists exactly
//! the paths the pass would report.

use std::path::Path;

use dirmirror_core::types::{SyncOptions, SyncPlan};

use crate::differ::compare_directories;
use crate::exclude::ExcludeSet;
use crate::orchestrator::needs_update;
use crate::SyncError;

/// Work out what mirroring `src_root` onto `dst_root` would change.
///
/// No files are written.
pub fn plan(src_root: &Path, dst_root: &Path, options: &SyncOptions) -> Result<SyncPlan, SyncError> {
    let exclude = ExcludeSet::new(&options.exclude)?;
    let partition = compare_directories(src_root, dst_root, &exclude)?;
    let mut plan = SyncPlan::default();

    for rel in &partition.common {
        let dst = dst_root.join(rel);
        if needs_update(&src_root.join(rel), &dst, options.compare) {
            plan.modify.push(dst);
        }
    }

    plan.create = partition
        .source_only
        .iter()
        .map(|rel| dst_root.join(rel))
        .collect();

    if options.delete && !partition.source_incomplete {
        plan.delete = partition
            .dest_only
            .iter()
            .map(|rel| dst_root.join(rel))
            .collect();
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::sync_with;
    use crate::DefaultCopier;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn mixed_trees() -> (TempDir, TempDir) {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        touch(src.path(), "same.txt", "same");
        touch(dst.path(), "same.txt", "same");
        touch(src.path(), "changed.txt", "v2");
        touch(dst.path(), "changed.txt", "v1");
        touch(src.path(), "new/file.txt", "n");
        touch(dst.path(), "stale/old.txt", "s");
        (src, dst)
    }

    #[test]
    fn plan_writes_nothing() {
        let (src, dst) = mixed_trees();
        let p = plan(src.path(), dst.path(), &SyncOptions::default()).unwrap();

        assert_eq!(p.modify, vec![dst.path().join("changed.txt")]);
        assert_eq!(
            p.create,
            vec![dst.path().join("new"), dst.path().join("new/file.txt")]
        );
        assert_eq!(
            p.delete,
            vec![dst.path().join("stale"), dst.path().join("stale/old.txt")]
        );
        assert!(!dst.path().join("new").exists());
        assert!(dst.path().join("stale/old.txt").exists());
        assert_eq!(fs::read_to_string(dst.path().join("changed.txt")).unwrap(), "v1");
    }

    #[test]
    fn plan_matches_the_following_sync() {
        let (src, dst) = mixed_trees();
        let options = SyncOptions::default();
        let p = plan(src.path(), dst.path(), &options).unwrap();
        let result = sync_with(src.path(), dst.path(), &options, &DefaultCopier).unwrap();

        assert_eq!(result.created, p.create);
        assert_eq!(result.modified, p.modify);
        assert_eq!(result.deleted, p.delete);
    }

    #[test]
    fn plan_without_delete_lists_no_deletions() {
        let (src, dst) = mixed_trees();
        let options = SyncOptions {
            delete: false,
            ..SyncOptions::default()
        };
        let p = plan(src.path(), dst.path(), &options).unwrap();
        assert!(p.delete.is_empty());
        assert!(!p.create.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn plan_lists_link_in_place_of_directory_as_modified() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        touch(src.path(), "dir/a.txt", "a");
        std::os::unix::fs::symlink(outside.path(), dst.path().join("dir")).unwrap();

        let p = plan(src.path(), dst.path(), &SyncOptions::default()).unwrap();
        assert_eq!(p.modify, vec![dst.path().join("dir")]);
        assert_eq!(p.create, vec![dst.path().join("dir/a.txt")]);
    }
}
