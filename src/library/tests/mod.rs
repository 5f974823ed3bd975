//! Library module tests
//!
//! - Installed core listing and removal
//! - Settings purge and option reset
//! - Backup and install round trips through zip archives

#[cfg(test)]
mod backup_tests;

use std::{fs, path::PathBuf};
use tempfile::TempDir;

use crate::library::CoreLibrary;

pub(super) const SNES9X_INFO: &str = "display_name = \"Nintendo - SNES / SFC (Snes9x)\"\n\
corename = \"Snes9x\"\n\
systemname = \"Super Nintendo Entertainment System\"\n";

pub(super) const MGBA_INFO: &str = "display_name = \"Nintendo - Game Boy Advance (mGBA)\"\n\
corename = \"mGBA\"\n";

/// Temp data directory with `cores/` and `info/`
pub(super) struct Fixture {
    pub temp_dir: TempDir,
    pub library: CoreLibrary,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let cores = temp_dir.path().join("cores");
        let info = temp_dir.path().join("info");
        fs::create_dir_all(&cores).unwrap();
        fs::create_dir_all(&info).unwrap();

        Self {
            library: CoreLibrary::new(cores, info),
            temp_dir,
        }
    }

    /// Adds a core library file, optionally with its `.info`
    pub fn add_core(&self, file: &str, contents: &[u8], info: Option<(&str, &str)>) -> PathBuf {
        let path = self.library.cores_dir().join(file);
        fs::write(&path, contents).unwrap();
        if let Some((info_name, info_text)) = info {
            fs::write(self.library.info_dir().join(info_name), info_text).unwrap();
        }
        path
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }
}
