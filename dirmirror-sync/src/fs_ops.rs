//! Filesystem primitives shared by the orchestrator: copy, create, delete.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{copy_err, delete_err, io_err, SyncError};

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Copy one entry from `src` to `dst` and return `dst`.
///
/// 1. Create `dst`'s parent directory if it is missing.
/// 2. Clear whatever stands in the way: a directory tree at `dst` is
///    removed, as is a symlink (never written through).
/// 3. Symlink source: recreate the link at `dst` with the same target.
/// 4. Regular file: copy bytes, then permissions and access/modification
///    times, so a timestamp comparison of the pair reports equality.
///
/// Every failure is a [`SyncError::Copy`].
pub fn copy_file(src: &Path, dst: &Path) -> Result<PathBuf, SyncError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| copy_err(src, dst, e))?;
    }

    let meta = fs::symlink_metadata(src).map_err(|e| copy_err(src, dst, e))?;
    let src_is_link = meta.file_type().is_symlink();
    clear_destination(dst, src_is_link).map_err(|e| copy_err(src, dst, e))?;

    if src_is_link {
        let target = fs::read_link(src).map_err(|e| copy_err(src, dst, e))?;
        make_symlink(src, &target, dst).map_err(|e| copy_err(src, dst, e))?;
        tracing::info!("linked: {}", dst.display());
        return Ok(dst.to_path_buf());
    }

    fs::copy(src, dst).map_err(|e| copy_err(src, dst, e))?;
    fs::set_permissions(dst, meta.permissions()).map_err(|e| copy_err(src, dst, e))?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
    .map_err(|e| copy_err(src, dst, e))?;

    tracing::info!("copied: {}", dst.display());
    Ok(dst.to_path_buf())
}

/// Make room at `dst` for a file or link. A regular file is left for
/// `fs::copy` to overwrite unless a link is about to take its place.
fn clear_destination(dst: &Path, for_link: bool) -> io::Result<()> {
    let existing = match fs::symlink_metadata(dst) {
        Ok(existing) => existing,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if existing.is_dir() {
        tracing::info!("replacing directory with file: {}", dst.display());
        fs::remove_dir_all(dst)
    } else if for_link || existing.file_type().is_symlink() {
        fs::remove_file(dst)
    } else {
        Ok(())
    }
}

#[cfg(unix)]
fn make_symlink(_src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn make_symlink(src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    if fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_src: &Path, _target: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Ensure a directory exists at `path`, creating parents as needed.
///
/// If anything already occupies `path` it is left as is, even when it is
/// not a directory.
pub fn create_directory(path: &Path) -> Result<PathBuf, SyncError> {
    if fs::symlink_metadata(path).is_ok() {
        return Ok(path.to_path_buf());
    }
    fs::create_dir_all(path).map_err(|e| io_err(path, e))?;
    tracing::info!("created directory: {}", path.display());
    Ok(path.to_path_buf())
}

/// Put a real directory at `path`, removing a file or symlink that
/// occupies it. The link itself is removed, never what it points to.
pub fn replace_with_directory(path: &Path) -> Result<PathBuf, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(path.to_path_buf()),
        Ok(_) => fs::remove_file(path).map_err(|e| delete_err(path, e))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(path, err)),
    }
    fs::create_dir_all(path).map_err(|e| io_err(path, e))?;
    tracing::info!("replaced with directory: {}", path.display());
    Ok(path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Remove the file, symlink or directory tree at `path`.
///
/// Absent paths are a no-op. Failures removing a directory tree are logged
/// and swallowed; failures removing a single file surface as
/// [`SyncError::Delete`].
pub fn delete_entry(path: &Path) -> Result<(), SyncError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            if let Err(err) = fs::remove_dir_all(path) {
                tracing::warn!("could not fully remove {}: {err}", path.display());
            } else {
                tracing::info!("deleted: {}", path.display());
            }
            Ok(())
        }
        Ok(_) => remove_file(path),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(delete_err(path, err)),
    }
}

/// Strict counterpart of [`delete_entry`]: every removal failure surfaces.
pub fn try_delete_entry(path: &Path) -> Result<(), SyncError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => match fs::remove_dir_all(path) {
            Ok(()) => {
                tracing::info!("deleted: {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(delete_err(path, err)),
        },
        Ok(_) => remove_file(path),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(delete_err(path, err)),
    }
}

fn remove_file(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("deleted: {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(delete_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
