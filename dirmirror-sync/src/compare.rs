//! Change detection for entries present on both sides.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use filetime::FileTime;

use dirmirror_core::types::CompareMode;

use crate::{error::io_err, SyncError};

const CHUNK: usize = 8 * 1024;

/// Equality test between two files, following symlinks.
///
/// - `by_content == true`: byte-for-byte comparison. Reflexive and symmetric.
/// - `by_content == false`: modification times truncated to whole seconds.
pub fn entries_equal(a: &Path, b: &Path, by_content: bool) -> Result<bool, SyncError> {
    let meta_a = fs::metadata(a).map_err(|e| io_err(a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| io_err(b, e))?;

    if !by_content {
        let mtime_a = FileTime::from_last_modification_time(&meta_a).unix_seconds();
        let mtime_b = FileTime::from_last_modification_time(&meta_b).unix_seconds();
        return Ok(mtime_a == mtime_b);
    }

    if meta_a.file_type() != meta_b.file_type() {
        return Ok(false);
    }
    if meta_a.is_dir() {
        return Ok(true);
    }
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    contents_equal(a, b)
}

fn contents_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let mut reader_a = BufReader::new(File::open(a).map_err(|e| io_err(a, e))?);
    let mut reader_b = BufReader::new(File::open(b).map_err(|e| io_err(b, e))?);
    let mut buf_a = [0u8; CHUNK];
    let mut buf_b = [0u8; CHUNK];

    loop {
        let n_a = read_full(&mut reader_a, &mut buf_a).map_err(|e| io_err(a, e))?;
        let n_b = read_full(&mut reader_b, &mut buf_b).map_err(|e| io_err(b, e))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of file.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Decide whether the destination copy of a common entry must be rewritten.
///
/// Symlinks are judged by their link target, never by what they point at.
/// Anything that cannot be inspected counts as changed.
pub fn has_changed(src: &Path, dst: &Path, mode: CompareMode) -> bool {
    let (Ok(src_meta), Ok(dst_meta)) = (fs::symlink_metadata(src), fs::symlink_metadata(dst))
    else {
        return true;
    };

    let src_link = src_meta.file_type().is_symlink();
    let dst_link = dst_meta.file_type().is_symlink();
    if src_link || dst_link {
        if !(src_link && dst_link) {
            return true;
        }
        return match (fs::read_link(src), fs::read_link(dst)) {
            (Ok(a), Ok(b)) => a != b,
            _ => true,
        };
    }

    match entries_equal(src, dst, mode == CompareMode::Content) {
        Ok(equal) => !equal,
        Err(err) => {
            tracing::debug!("treating {} as changed: {err}", dst.display());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use filetime::set_file_mtime;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn content_mode_is_reflexive() {
        let tmp = TempDir::new().unwrap();
        let f = write(&tmp, "f", b"hello");
        assert!(entries_equal(&f, &f, true).unwrap());
    }

    #[test]
    fn content_mode_is_symmetric() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"hello");
        let b = write(&tmp, "b", b"hellp");
        let c = write(&tmp, "c", b"hello");
        assert_eq!(
            entries_equal(&a, &b, true).unwrap(),
            entries_equal(&b, &a, true).unwrap()
        );
        assert!(!entries_equal(&a, &b, true).unwrap());
        assert!(entries_equal(&a, &c, true).unwrap());
        assert!(entries_equal(&c, &a, true).unwrap());
    }

    #[test]
    fn content_mode_spots_difference_past_first_chunk() {
        let tmp = TempDir::new().unwrap();
        let mut big = vec![7u8; CHUNK * 3 + 11];
        let a = write(&tmp, "a", &big);
        *big.last_mut().unwrap() = 8;
        let b = write(&tmp, "b", &big);
        assert!(!entries_equal(&a, &b, true).unwrap());
    }

    #[test]
    fn content_mode_different_lengths_differ() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"hi");
        let b = write(&tmp, "b", b"hi!");
        assert!(!entries_equal(&a, &b, true).unwrap());
    }

    #[test]
    fn timestamp_mode_ignores_sub_second_difference() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"one");
        let b = write(&tmp, "b", b"two");
        set_file_mtime(&a, FileTime::from_unix_time(1_700_000_000, 100_000_000)).unwrap();
        set_file_mtime(&b, FileTime::from_unix_time(1_700_000_000, 900_000_000)).unwrap();
        assert!(entries_equal(&a, &b, false).unwrap());
    }

    #[test]
    fn timestamp_mode_differs_across_seconds() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"same");
        let b = write(&tmp, "b", b"same");
        let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
        set_file_mtime(&a, old).unwrap();
        assert!(!entries_equal(&a, &b, false).unwrap());
    }

    #[test]
    fn missing_entry_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"x");
        let err = entries_equal(&a, &tmp.path().join("missing"), true).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn has_changed_treats_missing_destination_as_changed() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"x");
        assert!(has_changed(&a, &tmp.path().join("missing"), CompareMode::Content));
    }

    #[test]
    fn has_changed_follows_mode() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a", b"first");
        let b = write(&tmp, "b", b"other");
        let t = FileTime::from_unix_time(1_700_000_000, 0);
        set_file_mtime(&a, t).unwrap();
        set_file_mtime(&b, t).unwrap();

        assert!(has_changed(&a, &b, CompareMode::Content));
        assert!(!has_changed(&a, &b, CompareMode::Timestamp));
    }

    #[test]
    #[cfg(unix)]
    fn has_changed_compares_link_targets() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        symlink("target-one", tmp.path().join("src_link")).unwrap();
        symlink("target-one", tmp.path().join("same_link")).unwrap();
        symlink("target-two", tmp.path().join("other_link")).unwrap();
        let plain = write(&tmp, "plain", b"x");

        let src = tmp.path().join("src_link");
        assert!(!has_changed(&src, &tmp.path().join("same_link"), CompareMode::Content));
        assert!(has_changed(&src, &tmp.path().join("other_link"), CompareMode::Content));
        assert!(has_changed(&src, &plain, CompareMode::Content));
        assert!(has_changed(&plain, &src, CompareMode::Content));
    }
}
