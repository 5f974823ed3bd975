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

//! Installed core management
//!
//! A [`CoreLibrary`] is a pair of directories: `cores/` with the libretro
//! shared libraries and `info/` with their `.info` metadata. On top of that
//! it can:
//!
//! - List installed cores with titles, sorted by core or by system
//! - Uninstall a core, purge its settings, reset its options
//! - Back a core up into a zip archive and install it again from one
//!
//! # Example
//!
//! ```no_run
//! use phoenix_shell::library::{CoreLibrary, CoreSort};
//!
//! let library = CoreLibrary::new("/data/phoenix/cores".into(), "/data/phoenix/info".into());
//! for core in library.installed_cores(CoreSort::BySystem)? {
//!     println!("{} - {}", core.system_title, core.core_title);
//! }
//! # Ok::<(), phoenix_shell::library::LibraryError>(())
//! ```

mod archive;

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigManager};
use crate::core::{info_file_name, libretro_name, CoreInfo};

/// Core library errors
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not a core library or backup: {0}")]
    NotACore(PathBuf),
}

/// Listing order for [`CoreLibrary::installed_cores`]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CoreSort {
    ByCore,
    #[default]
    BySystem,
}

impl CoreSort {
    pub fn from_flag(by_system: bool) -> Self {
        if by_system {
            CoreSort::BySystem
        } else {
            CoreSort::ByCore
        }
    }
}

/// One core in the cores directory
#[derive(Clone, Debug)]
pub struct InstalledCore {
    pub path: PathBuf,
    /// `None` when no `.info` file exists or it could not be read
    pub info: Option<CoreInfo>,
    pub core_title: String,
    pub system_title: String,
}

impl InstalledCore {
    fn new(path: PathBuf, info: Option<CoreInfo>) -> Self {
        let (core_title, system_title) = match &info {
            Some(info) => (info.core_title(), info.system_title()),
            None => (
                libretro_name(&file_name(&path)).to_string(),
                "Unknown".to_string(),
            ),
        };

        Self {
            path,
            info,
            core_title,
            system_title,
        }
    }

    /// Settings prefix of this core, e.g. `snes9x`
    pub fn libretro_name(&self) -> String {
        libretro_name(&file_name(&self.path)).to_string()
    }
}

/// A core backup found in a backup directory
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalBackup {
    pub path: PathBuf,
    /// Matching `.info`, from the backup directory or the installed info dir
    pub info_path: Option<PathBuf>,
}

/// What [`CoreLibrary::purge_core_settings`] removed
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PurgeReport {
    pub keys_removed: usize,
    pub config_dir_removed: bool,
}

/// Cores directory plus info directory
#[derive(Clone, Debug)]
pub struct CoreLibrary {
    cores_dir: PathBuf,
    info_dir: PathBuf,
}

impl CoreLibrary {
    pub fn new(cores_dir: PathBuf, info_dir: PathBuf) -> Self {
        Self {
            cores_dir,
            info_dir,
        }
    }

    pub fn cores_dir(&self) -> &Path {
        &self.cores_dir
    }

    pub fn info_dir(&self) -> &Path {
        &self.info_dir
    }

    /// Location of the `.info` file for `core`, whether or not it exists
    pub fn info_path(&self, core: &Path) -> Option<PathBuf> {
        info_file_name(&file_name(core)).map(|name| self.info_dir.join(name))
    }

    /// Every file in the cores directory with its metadata.
    ///
    /// Sorting is case-insensitive on the chosen title. A missing cores
    /// directory is an empty library. A broken `.info` is logged and the core
    /// is listed without metadata.
    pub fn installed_cores(&self, sort: CoreSort) -> Result<Vec<InstalledCore>, LibraryError> {
        let mut cores = Vec::new();

        for path in list_files(&self.cores_dir)? {
            let info = match CoreInfo::load(&self.info_dir, &path) {
                Ok(info) => info,
                Err(e) => {
                    warn!(core = %path.display(), error = %e, "unreadable core info");
                    None
                }
            };
            cores.push(InstalledCore::new(path, info));
        }

        match sort {
            CoreSort::ByCore => cores.sort_by_cached_key(|c| c.core_title.to_lowercase()),
            CoreSort::BySystem => cores.sort_by_cached_key(|c| c.system_title.to_lowercase()),
        }
        debug!(count = cores.len(), ?sort, "listed installed cores");

        Ok(cores)
    }

    /// Deletes a core library file.
    ///
    /// Only files directly inside the cores directory are removed; anything
    /// else is `LibraryError::NotACore`.
    pub fn remove_core(&self, core: &Path) -> Result<(), LibraryError> {
        if !core.is_file() || !self.holds(core) {
            return Err(LibraryError::NotACore(core.to_path_buf()));
        }

        fs::remove_file(core)?;
        info!(core = %core.display(), "removed core");
        Ok(())
    }

    /// Removes everything the frontend stored for `core`.
    ///
    /// Drops every `<name>_` key from the settings file (backed up first,
    /// only touched when it exists and has such keys) and deletes
    /// `<config_dir>/<name>/`.
    pub fn purge_core_settings(
        &self,
        core: &Path,
        settings_cfg: &Path,
        config_dir: &Path,
    ) -> Result<PurgeReport, LibraryError> {
        let name = libretro_name(&file_name(core)).to_string();
        let mut report = PurgeReport::default();

        if settings_cfg.is_file() {
            let manager = ConfigManager::new(settings_cfg.to_path_buf())?;
            let mut config = manager.load()?;

            report.keys_removed = config.remove_keys_with_prefix(&format!("{}_", name));
            if report.keys_removed > 0 {
                manager.begin_transaction()?.commit(&config)?;
            }
        }

        let core_config_dir = config_dir.join(&name);
        if core_config_dir.is_dir() {
            fs::remove_dir_all(&core_config_dir)?;
            report.config_dir_removed = true;
        }

        info!(
            core = %name,
            keys = report.keys_removed,
            config_dir = report.config_dir_removed,
            "purged core settings"
        );
        Ok(report)
    }

    /// Deletes the `*.opt` files in the core's config directory.
    ///
    /// Returns how many were deleted.
    pub fn reset_core_options(&self, core: &Path, config_dir: &Path) -> Result<usize, LibraryError> {
        let dir = config_dir.join(libretro_name(&file_name(core)));
        let mut removed = 0;

        for path in list_files(&dir)? {
            if path.extension().is_some_and(|ext| ext == "opt") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        debug!(dir = %dir.display(), removed, "reset core options");
        Ok(removed)
    }

    /// Zips `core` and its `.info` into `<backup_dir>/<core stem>.zip`.
    ///
    /// An existing backup of the same core is replaced. `progress` receives
    /// the percentage of the core file written so far.
    pub fn backup_core(
        &self,
        core: &Path,
        backup_dir: &Path,
        mut progress: impl FnMut(u8),
    ) -> Result<PathBuf, LibraryError> {
        if !core.is_file() {
            return Err(LibraryError::NotACore(core.to_path_buf()));
        }
        let stem = core
            .file_stem()
            .ok_or_else(|| LibraryError::NotACore(core.to_path_buf()))?;

        fs::create_dir_all(backup_dir)?;
        let target = backup_dir.join(format!("{}.zip", stem.to_string_lossy()));
        let info = self.info_path(core).filter(|path| path.is_file());

        archive::write_backup_archive(core, info.as_deref(), &target, &mut progress)?;
        info!(core = %core.display(), backup = %target.display(), "backed up core");

        Ok(target)
    }

    /// Core backups (`.so` files and `.zip` archives) in `backup_dir`.
    pub fn local_backups(&self, backup_dir: &Path) -> Result<Vec<LocalBackup>, LibraryError> {
        let mut backups = Vec::new();

        for path in list_files(backup_dir)? {
            let is_backup = path
                .extension()
                .is_some_and(|ext| ext == "so" || ext == "zip");
            if !is_backup {
                continue;
            }

            let info_path = info_file_name(&file_name(&path)).and_then(|name| {
                [backup_dir.join(&name), self.info_dir.join(&name)]
                    .into_iter()
                    .find(|candidate| candidate.is_file())
            });
            backups.push(LocalBackup { path, info_path });
        }

        backups.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(backups)
    }

    /// Installs a core from a backup file.
    ///
    /// A `.so` is copied into the cores directory. A `.zip` is extracted,
    /// `.info` entries into the info directory and everything else into the
    /// cores directory. When the backup brought no `.info`, a sibling one
    /// from the backup's directory is copied instead.
    ///
    /// Returns the path of the installed core.
    pub fn install_backup(
        &self,
        backup: &Path,
        mut progress: impl FnMut(u8),
    ) -> Result<PathBuf, LibraryError> {
        fs::create_dir_all(&self.cores_dir)?;
        fs::create_dir_all(&self.info_dir)?;

        let name = file_name(backup);
        let (core, brought_info) = match backup.extension().and_then(|ext| ext.to_str()) {
            Some("so") => {
                let target = self.cores_dir.join(&name);
                archive::copy_file(backup, &target, &mut progress)?;
                (target, false)
            }
            Some("zip") => {
                let has_core = archive::archive_file_names(backup)?
                    .iter()
                    .any(|entry| !entry.ends_with(".info") && !entry.ends_with('/'));
                if !has_core {
                    return Err(LibraryError::NotACore(backup.to_path_buf()));
                }

                let extracted =
                    archive::extract_backup(backup, &self.cores_dir, &self.info_dir, &mut progress)?;
                let core = extracted
                    .cores
                    .into_iter()
                    .next()
                    .ok_or_else(|| LibraryError::NotACore(backup.to_path_buf()))?;
                (core, !extracted.infos.is_empty())
            }
            _ => return Err(LibraryError::NotACore(backup.to_path_buf())),
        };

        if !brought_info {
            self.copy_sibling_info(backup)?;
        }

        info!(backup = %backup.display(), core = %core.display(), "installed core");
        Ok(core)
    }

    /// Whether `core` sits directly in the cores directory
    fn holds(&self, core: &Path) -> bool {
        let (Some(parent), Ok(cores_dir)) = (core.parent(), fs::canonicalize(&self.cores_dir))
        else {
            return false;
        };
        fs::canonicalize(parent).is_ok_and(|parent| parent == cores_dir)
    }

    fn copy_sibling_info(&self, backup: &Path) -> Result<(), LibraryError> {
        let (Some(dir), Some(info_name)) = (backup.parent(), info_file_name(&file_name(backup)))
        else {
            return Ok(());
        };

        let sibling = dir.join(&info_name);
        if sibling.is_file() {
            archive::copy_file(&sibling, &self.info_dir.join(&info_name), &mut |_| {})?;
            debug!(info = %sibling.display(), "copied sibling core info");
        }

        Ok(())
    }
}

/// Regular files directly inside `dir`, sorted; a missing directory is empty.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in read {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
