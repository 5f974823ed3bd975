//! Configuration files: the key/value store, atomic writes and backups.
//!
//! This module provides the file-level half of configuration handling:
//!
//! - **`ConfigFile`**: load, query, mutate and write `key = "value"` files
//!   (`retroarch.cfg`, core `.info` files, name tables)
//! - **Atomic writes**: temp-file-then-rename, so a crash mid-write never
//!   corrupts the previous file
//! - **Backups**: `ConfigManager` keeps timestamped copies of the settings
//!   file and `ConfigTransaction` can restore them
//! - **Settings**: the frontend preference set and its projection into
//!   `retroarch.cfg`
//!
//! # Example
//!
//! ```no_run
//! use phoenix_shell::config::{ConfigFile, ConfigManager};
//!
//! let manager = ConfigManager::new("/home/user/.local/share/phoenix/retroarch.cfg".into())?;
//! let mut config = manager.load()?;
//! config.set_string("video_refresh_rate", "59.94");
//!
//! // Backup of the current file, then an atomic replace
//! manager.begin_transaction()?.commit(&config)?;
//! # Ok::<(), phoenix_shell::config::ConfigError>(())
//! ```

pub mod error;
pub mod settings;
pub mod store;
pub mod transaction;

use atomic_write_file::AtomicWriteFile;
use chrono::{Local, NaiveDateTime};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub use error::ConfigError;
pub use settings::{AudioHints, Settings};
pub use store::ConfigFile;
pub use transaction::ConfigTransaction;

/// Timestamp suffix appended to backup file names
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Replaces `path` with `content` via temp file and rename.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e))
    })?;

    file.write_all(content)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit().map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e))
    })?;

    Ok(())
}

/// Owns one config file plus its backup directory.
///
/// Used for `retroarch.cfg`, where a bad write would lose every frontend
/// setting. All writes go through [`ConfigTransaction`].
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    backup_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for `config_path`.
    ///
    /// The config file itself does not need to exist yet. The backup
    /// directory (`<parent>/backups`) is created when missing. A symlinked
    /// config is allowed but logged.
    ///
    /// # Errors
    ///
    /// `ConfigError::BackupDirNotWritable` if the backup directory cannot be
    /// created or is read-only.
    pub fn new(config_path: PathBuf) -> Result<Self, ConfigError> {
        if config_path.read_link().is_ok() {
            warn!(path = %config_path.display(), "config file is a symlink");
        }

        // e.g. ~/.local/share/phoenix/retroarch.cfg → ~/.local/share/phoenix/backups/
        let backup_dir = config_path
            .parent()
            .ok_or_else(|| {
                ConfigError::BackupDirNotWritable(PathBuf::from(
                    "Config file has no parent directory",
                ))
            })?
            .join("backups");

        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| ConfigError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(ConfigError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self {
            config_path,
            backup_dir,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Loads the managed file (empty store if it does not exist yet).
    pub fn load(&self) -> Result<ConfigFile, ConfigError> {
        ConfigFile::load(&self.config_path)
    }

    /// Starts a transaction, backing up the current file first.
    pub fn begin_transaction(&self) -> Result<ConfigTransaction<'_>, ConfigError> {
        ConfigTransaction::begin(self)
    }

    /// Copies the current config to `backups/<name>.<YYYY-MM-DD_HHMMSS>`.
    pub(crate) fn create_timestamped_backup(&self) -> Result<PathBuf, ConfigError> {
        let content = fs::read(&self.config_path)?;

        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = self
            .backup_dir
            .join(format!("{}.{}", self.file_name()?, timestamp));

        fs::write(&backup_path, &content)
            .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;
        debug!(backup = %backup_path.display(), "created config backup");

        Ok(backup_path)
    }

    /// Lists backups of this config, newest first.
    ///
    /// Files in the backup directory that do not match
    /// `<name>.<timestamp>` are ignored.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let prefix = format!("{}.", self.file_name()?);
        let mut backups: Vec<(NaiveDateTime, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stamp) = name.strip_prefix(&prefix) else {
                continue;
            };
            if let Ok(time) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT) {
                backups.push((time, path));
            }
        }

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    /// Deletes all but the `keep` most recent backups.
    ///
    /// Returns the number of deleted files.
    pub fn cleanup_old_backups(&self, keep: usize) -> Result<usize, ConfigError> {
        let mut deleted = 0;

        for old in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_file(&old)?;
            deleted += 1;
        }

        Ok(deleted)
    }

    fn file_name(&self) -> Result<&str, ConfigError> {
        self.config_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ConfigError::BackupFailed(format!(
                    "Config path has no usable file name: {}",
                    self.config_path.display()
                ))
            })
    }
}

#[cfg(test)]
mod tests;
