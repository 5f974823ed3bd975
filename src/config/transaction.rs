// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration transaction management with automatic backups
//!
//! Wraps a [`ConfigFile`] write in a backup-then-replace sequence.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::{write_atomic, ConfigError, ConfigFile, ConfigManager};

/// Atomic configuration write with a rollback point.
///
/// # Lifecycle
///
/// 1. `begin()` - backs up the current file, if there is one
/// 2. Caller builds the new [`ConfigFile`] in memory
/// 3. `commit()` - atomic replace, or `rollback()` - restore the backup
///
/// # Example
///
/// ```no_run
/// use phoenix_shell::config::{ConfigManager, ConfigTransaction};
/// use std::path::PathBuf;
///
/// let manager = ConfigManager::new(PathBuf::from("retroarch.cfg"))?;
/// let mut config = manager.load()?;
/// let tx = ConfigTransaction::begin(&manager)?;
///
/// config.remove_keys_with_prefix("snes9x_");
/// if let Err(e) = tx.commit(&config) {
///     eprintln!("Commit failed: {}", e);
/// }
/// # Ok::<(), phoenix_shell::config::ConfigError>(())
/// ```
pub struct ConfigTransaction<'a> {
    manager: &'a ConfigManager,
    /// `None` when the config did not exist at `begin()`
    backup_path: Option<PathBuf>,
}

impl<'a> ConfigTransaction<'a> {
    /// Begins a transaction.
    ///
    /// When the config file exists a timestamped backup is written
    /// immediately. A config that does not exist yet has nothing to back up;
    /// rolling back then removes whatever `commit()` created.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing config cannot be read or the backup
    /// cannot be written. Nothing is modified in that case.
    pub fn begin(manager: &'a ConfigManager) -> Result<Self, ConfigError> {
        let backup_path = if manager.config_path().exists() {
            Some(manager.create_timestamped_backup()?)
        } else {
            None
        };

        Ok(Self {
            manager,
            backup_path,
        })
    }

    /// Backup taken at `begin()`
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Atomically replaces the config with `config`.
    ///
    /// Consumes the transaction. On error the original file is untouched and
    /// the backup stays in the backup directory.
    pub fn commit(self, config: &ConfigFile) -> Result<(), ConfigError> {
        config.write(self.manager.config_path())
    }

    /// Restores the state from when the transaction began.
    ///
    /// Borrows `self`, so a failed rollback can be retried.
    pub fn rollback(&self) -> Result<(), ConfigError> {
        let target = self.manager.config_path();

        match &self.backup_path {
            Some(backup_path) => {
                let content = fs::read(backup_path).map_err(|e| {
                    ConfigError::BackupFailed(format!(
                        "Cannot read backup {}: {}",
                        backup_path.display(),
                        e
                    ))
                })?;
                write_atomic(target, &content)?;
            }
            None => match fs::remove_file(target) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(ConfigError::Io(e)),
            },
        }

        info!(path = %target.display(), "rolled back config");
        Ok(())
    }
}
