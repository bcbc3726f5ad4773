//! Entity Store
//!
//! Whole-file JSON persistence on top of [`crate::core::fs`]: resolves the per-user
//! data directory, loads a file as "bytes or empty", and hands every write to the
//! atomic writer.
//!
//! The store assumes a single active process. Two processes mutating the same
//! files both succeed and the last writer wins; the file stays well-formed but
//! one update is lost. External tools (sync, backup) may read or replace the
//! files between calls, so nothing is cached across calls.
//!
//! Layout: `{data_dir}/videos.json`, `{data_dir}/settings.json`, `{data_dir}/logs/`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::fs::atomic_write_json_with_hook;
use crate::core::{CoreError, CoreResult};

/// Application directory name under the platform data root
pub const APP_DIR_NAME: &str = "vidlogd";

/// Environment variable naming the data directory verbatim
pub const DATA_DIR_ENV: &str = "VIDLOG_DATA_DIR";

/// XDG base directory override, honoured on every platform
pub const XDG_DATA_HOME_ENV: &str = "XDG_DATA_HOME";

/// Video collection file name
pub const VIDEOS_FILE: &str = "videos.json";

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Log directory name
pub const LOGS_DIR: &str = "logs";

// =============================================================================
// Data Directory Resolution
// =============================================================================

/// Resolves the data directory from the process environment.
pub fn resolve_data_dir() -> CoreResult<PathBuf> {
    resolve_data_dir_with(|key| std::env::var_os(key))
}

/// Resolves the data directory using `lookup` for environment variables.
///
/// Order: `VIDLOG_DATA_DIR` as-is, `XDG_DATA_HOME/vidlogd`, the OS data root
/// (`dirs::data_dir()`), then `~/.local/share/vidlogd`. Empty variables are ignored.
pub fn resolve_data_dir_with<F>(lookup: F) -> CoreResult<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(dir) = non_empty(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    if let Some(xdg) = non_empty(XDG_DATA_HOME_ENV) {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }

    if let Some(root) = dirs::data_dir() {
        return Ok(root.join(APP_DIR_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_DIR_NAME))
        .ok_or_else(|| {
            CoreError::DataDirUnavailable("could not determine the user home directory".to_string())
        })
}

// =============================================================================
// Entity Store
// =============================================================================

/// Handle on the application data directory.
#[derive(Clone, Debug)]
pub struct EntityStore {
    root: PathBuf,
    /// Fails the next write between the temp file and the rename
    #[cfg(test)]
    write_fault: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl EntityStore {
    /// Opens (and creates, if absent) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            CoreError::DataDirUnavailable(format!("failed to create {}: {}", root.display(), e))
        })?;
        Ok(Self {
            root,
            #[cfg(test)]
            write_fault: Default::default(),
        })
    }

    /// Opens the store at the platform data directory.
    pub fn open_default() -> CoreResult<Self> {
        Self::open(resolve_data_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn videos_path(&self) -> PathBuf {
        self.root.join(VIDEOS_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Reads a file, treating "missing" and "zero length" the same way.
    pub fn load_bytes(&self, path: &Path) -> CoreResult<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads and parses a JSON file. `Ok(None)` when the file is missing or
    /// empty; `ParseError` when it exists but does not parse as `T`.
    pub fn load_json<T: DeserializeOwned>(&self, path: &Path) -> CoreResult<Option<T>> {
        let Some(bytes) = self.load_bytes(path)? else {
            debug!("{} missing or empty", path.display());
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CoreError::parse(path, e))
    }

    /// Serializes `value` as indented JSON and atomically replaces `path`.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> CoreResult<()> {
        atomic_write_json_with_hook(path, value, |tmp| self.before_rename(tmp))
    }

    #[cfg(not(test))]
    fn before_rename(&self, _tmp: &Path) -> std::io::Result<()> {
        Ok(())
    }

    #[cfg(test)]
    fn before_rename(&self, _tmp: &Path) -> std::io::Result<()> {
        use std::sync::atomic::Ordering;

        if self.write_fault.swap(false, Ordering::SeqCst) {
            return Err(std::io::Error::other("injected write fault"));
        }
        Ok(())
    }

    /// Makes the next write through this store (or any clone of it) die after
    /// the temp file is written and before it is renamed into place.
    #[cfg(test)]
    pub(crate) fn fail_next_write(&self) {
        self.write_fault.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}
