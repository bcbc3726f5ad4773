//! Filesystem utilities.
//!
//! This module provides the crash-safe single-file replace primitive that every
//! persisted file (`videos.json`, `settings.json`) goes through.
//!
//! Guarantees:
//! - A reader observes either the complete previous contents or the complete new
//!   contents of the destination, never a partial write.
//! - On any failure the destination is left untouched and the temporary file is
//!   removed (best effort).
//!
//! Known gap: on Windows, if renaming over an existing destination is refused, the
//! destination is removed and the rename retried. A crash between those two steps
//! leaves no file at all.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::CoreResult;

/// Permissions applied to persisted data files (Unix only).
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Prefix shared by every temporary sibling file.
const TMP_PREFIX: &str = ".tmp-";

/// Attempts at finding an unused temporary file name before giving up.
const TMP_NAME_ATTEMPTS: usize = 8;

/// Write bytes to `path` using an atomic replace pattern.
///
/// Implementation notes:
/// - Create a uniquely named temporary file in the destination's directory so the
///   final rename never crosses filesystems.
/// - Write, flush and fsync the temp file, then close it.
/// - Rename it over the destination.
/// - Fsync the directory so the rename itself is durable (Unix only). Once the
///   rename has succeeded the write is committed, so a failed directory sync is
///   logged and `Ok` is still returned.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8], mode: u32) -> CoreResult<()> {
    atomic_write_with_hook(path, bytes, mode, |_| Ok(()))
}

/// Write a JSON value atomically with pretty formatting.
pub fn atomic_write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> CoreResult<()> {
    atomic_write_json_with_hook(path, value, |_| Ok(()))
}

/// [`atomic_write_json_pretty`] with a `before_rename` hook, see
/// [`atomic_write_with_hook`].
pub(crate) fn atomic_write_json_with_hook<T, F>(
    path: &Path,
    value: &T,
    before_rename: F,
) -> CoreResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write_with_hook(path, &bytes, DEFAULT_FILE_MODE, before_rename)
}

/// Same as [`atomic_write_bytes`], with a hook that runs after the temp file is
/// fully written and closed but before it is renamed into place. An error from
/// the hook aborts the write exactly like a failed rename would.
pub(crate) fn atomic_write_with_hook<F>(
    path: &Path,
    bytes: &[u8],
    mode: u32,
    before_rename: F,
) -> CoreResult<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    write_replacing(path, bytes, mode, before_rename, sync_dir)
}

fn write_replacing<F, S>(
    path: &Path,
    bytes: &[u8],
    mode: u32,
    before_rename: F,
    sync: S,
) -> CoreResult<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
    S: FnOnce(&Path) -> std::io::Result<()>,
{
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir)?;

    let (file, guard) = create_temp_sibling(&dir, path)?;
    write_and_sync(file, bytes, mode)?;

    before_rename(guard.path())?;
    replace(guard.path(), path)?;
    guard.commit();

    if let Err(e) = sync(&dir) {
        warn!("Wrote {} but failed to sync {}: {}", path.display(), dir.display(), e);
    }

    debug!("Atomically wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Removes the temporary file on drop unless the rename succeeded.
struct TempFileGuard {
    path: PathBuf,
    committed: bool,
}

impl TempFileGuard {
    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

fn create_temp_sibling(dir: &Path, dest: &Path) -> CoreResult<(File, TempFileGuard)> {
    let base = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let mut last_err = None;
    for _ in 0..TMP_NAME_ATTEMPTS {
        let suffix: u64 = rand::random();
        let tmp_path = dir.join(format!("{TMP_PREFIX}{base}-{suffix:016x}"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => {
                let guard = TempFileGuard {
                    path: tmp_path,
                    committed: false,
                };
                return Ok((file, guard));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => last_err = Some(e),
            Err(e) => return Err(e.into()),
        }
    }

    Err(last_err
        .unwrap_or_else(|| std::io::Error::other("could not allocate a temporary file name"))
        .into())
}

fn write_and_sync(file: File, bytes: &[u8], mode: u32) -> CoreResult<()> {
    set_mode(&file, mode)?;

    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(not(windows))]
fn replace(src_tmp: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::rename(src_tmp, dest)
}

#[cfg(windows)]
fn replace(src_tmp: &Path, dest: &Path) -> std::io::Result<()> {
    match std::fs::rename(src_tmp, dest) {
        Ok(()) => Ok(()),
        Err(e) if dest.is_file() => {
            warn!(
                "Rename over {} refused ({}), removing destination first",
                dest.display(),
                e
            );
            std::fs::remove_file(dest)?;
            std::fs::rename(src_tmp, dest)
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(TMP_PREFIX))
            .collect()
    }

    #[test]
    fn atomic_write_bytes_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");

        atomic_write_bytes(&path, b"one", DEFAULT_FILE_MODE).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");

        atomic_write_bytes(&path, b"two", DEFAULT_FILE_MODE).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");

        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("c.json");

        atomic_write_bytes(&path, br#"{"v":1}"#, DEFAULT_FILE_MODE).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"v":1}"#);
        assert!(leftover_temp_files(path.parent().unwrap()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_applies_requested_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mode.json");

        atomic_write_bytes(&path, b"x", 0o600).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        atomic_write_bytes(&path, b"y", DEFAULT_FILE_MODE).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_rename_failure_cleans_up_temp_file() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("parent");
        // A non-empty directory at the destination makes the rename fail everywhere.
        let target = parent.join("target");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let result = atomic_write_bytes(&target, b"data", DEFAULT_FILE_MODE);

        assert!(result.is_err());
        assert!(target.is_dir());
        assert!(leftover_temp_files(&parent).is_empty());
    }

    #[test]
    fn test_fault_before_rename_leaves_destination_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        atomic_write_bytes(&path, b"[]", DEFAULT_FILE_MODE).unwrap();

        let mut seen_tmp = None;
        let result = atomic_write_with_hook(&path, b"[{\"id\":\"x\"}]", DEFAULT_FILE_MODE, |tmp| {
            // The temp file is complete and lives next to the destination.
            assert_eq!(std::fs::read(tmp)?, b"[{\"id\":\"x\"}]");
            assert_eq!(tmp.parent(), path.parent());
            seen_tmp = Some(tmp.to_path_buf());
            Err(std::io::Error::other("injected crash"))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");
        assert!(!seen_tmp.unwrap().exists());
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_fault_on_first_write_leaves_no_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let result = atomic_write_with_hook(&path, b"{}", DEFAULT_FILE_MODE, |_| {
            Err(std::io::Error::other("injected crash"))
        });

        assert!(result.is_err());
        assert!(!path.exists());
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_directory_sync_after_rename_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        atomic_write_bytes(&path, b"[]", DEFAULT_FILE_MODE).unwrap();

        let result = write_replacing(
            &path,
            b"[1]",
            DEFAULT_FILE_MODE,
            |_| Ok(()),
            |_| Err(std::io::Error::other("fsync refused")),
        );

        assert!(result.is_ok());
        assert_eq!(std::fs::read(&path).unwrap(), b"[1]");
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_write_json_pretty_is_indented() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");

        atomic_write_json_pretty(&path, &vec![1, 2]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  1"));
        let parsed: Vec<i32> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![1, 2]);
    }

    #[test]
    fn test_repeated_writes_never_leave_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("churn.json");

        for i in 0..20 {
            atomic_write_bytes(&path, format!("{i}").as_bytes(), DEFAULT_FILE_MODE).unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "19");
        assert!(leftover_temp_files(dir.path()).is_empty());
    }
}
