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

//! src/core/core_info.rs
//!
//! Typed view of a libretro core's `.info` metadata file
//!
//! A core `snes9x_libretro_android.so` is described by
//! `snes9x_libretro.info`, a config-store file with keys such as
//! `display_name`, `supported_extensions` and `firmware<N>_path`.
//!
//! # Empty values
//! List fields follow one policy: a missing key and an empty value both give
//! an empty list. Placeholders like `N/A` or `Unknown` only appear in the
//! `*_title` / display helpers, never in the data.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::warn;

use crate::config::{ConfigError, ConfigFile};
use crate::core::types::{FirmwareStatus, MultiValue};

/// `<stem>[_android].<lib ext>[.zip]`
#[allow(clippy::expect_used)]
static CORE_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stem>.+?)(?:_android)?\.(?:so\.zip|so|dll|dylib|zip)$")
        .expect("core file name pattern should be valid regex")
});

/// Upper bound on firmware entries read from one `.info`
const MAX_FIRMWARE: u64 = 256;

/// One firmware file a core asks for, relative to the system directory
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Firmware {
    pub description: Option<String>,
    pub path: Option<String>,
    pub optional: bool,
}

impl Firmware {
    /// Checks whether the file exists under `system_dir`.
    ///
    /// A firmware entry without a path can never be present.
    pub fn status(&self, system_dir: &Path) -> FirmwareStatus {
        let present = self
            .path
            .as_deref()
            .is_some_and(|rel| system_dir.join(rel).exists());

        match (present, self.optional) {
            (true, _) => FirmwareStatus::Present,
            (false, true) => FirmwareStatus::MissingOptional,
            (false, false) => FirmwareStatus::MissingRequired,
        }
    }
}

/// Metadata for one core
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CoreInfo {
    pub display_name: Option<String>,
    pub core_name: Option<String>,
    pub system_name: Option<String>,
    pub manufacturer: MultiValue,
    pub license: MultiValue,
    pub authors: MultiValue,
    pub supported_extensions: MultiValue,
    pub required_hw_api: MultiValue,
    pub permissions: MultiValue,
    /// Free-form notes, one line per item
    pub notes: MultiValue,
    pub description: Option<String>,
    pub firmware: Vec<Firmware>,
}

impl CoreInfo {
    /// Reads every known key from a parsed `.info` file.
    ///
    /// # Errors
    ///
    /// `ConfigError::TypeMismatch` when `firmware_count` is not an integer or
    /// a `firmware<N>_opt` flag is not a boolean.
    pub fn from_config(info: &ConfigFile) -> Result<Self, ConfigError> {
        let string = |key: &str| info.get_string(key).map(str::to_string);

        let declared = if info.key_exists("firmware_count") {
            info.get_int("firmware_count")?.max(0) as u64
        } else {
            0
        };

        // Entries past the last indexed key would carry no data at all
        let firmware_count = declared.min(firmware_slots(info)).min(MAX_FIRMWARE);
        if declared > firmware_count {
            warn!(
                declared,
                read = firmware_count,
                "firmware_count exceeds the listed firmware entries"
            );
        }

        let mut firmware = Vec::new();
        for i in 0..firmware_count {
            let opt_key = format!("firmware{}_opt", i);
            firmware.push(Firmware {
                description: string(&format!("firmware{}_desc", i)),
                path: string(&format!("firmware{}_path", i)),
                optional: info.key_exists(&opt_key) && info.get_bool(&opt_key)?,
            });
        }

        Ok(Self {
            display_name: string("display_name"),
            core_name: string("corename"),
            system_name: string("systemname"),
            manufacturer: info.get_multi("manufacturer"),
            license: info.get_multi("license"),
            authors: info.get_multi("authors"),
            supported_extensions: info.get_multi("supported_extensions"),
            required_hw_api: info.get_multi("required_hw_api"),
            permissions: info.get_multi("permissions"),
            notes: info.get_multi("notes"),
            description: string("description"),
            firmware,
        })
    }

    /// Loads the `.info` file for `core_path` from `info_dir`.
    ///
    /// Returns `Ok(None)` when the core has no info file.
    pub fn load(info_dir: &Path, core_path: &Path) -> Result<Option<Self>, ConfigError> {
        let Some(info_path) = info_path_for(info_dir, core_path) else {
            return Ok(None);
        };
        if !info_path.is_file() {
            return Ok(None);
        }

        let info = ConfigFile::load(&info_path)?;
        Self::from_config(&info).map(Some)
    }

    /// Title naming the core, e.g. `Snes9x`
    pub fn core_title(&self) -> String {
        best_core_title(
            self.display_name.as_deref().unwrap_or("N/A"),
            self.core_name.as_deref(),
        )
    }

    /// Title naming the emulated system, e.g. `Nintendo - SNES / SFC`
    pub fn system_title(&self) -> String {
        best_system_title(
            self.display_name.as_deref().unwrap_or("N/A"),
            self.system_name.as_deref(),
        )
    }

    /// Notes with each `|` item on its own line
    pub fn notes_text(&self) -> Option<String> {
        (!self.notes.is_empty()).then(|| self.notes.display_or("\n", ""))
    }

    /// Firmware entries with their presence under `system_dir`
    pub fn firmware_report(&self, system_dir: &Path) -> Vec<(&Firmware, FirmwareStatus)> {
        self.firmware
            .iter()
            .map(|fw| (fw, fw.status(system_dir)))
            .collect()
    }

    /// Lower-cased extensions this core loads, for the content browser filter
    pub fn extension_filter(&self) -> Vec<String> {
        self.supported_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

/// Settings-key prefix name of a core.
///
/// Strips the directory, then everything from the last `_libretro`, or from
/// the first `.` when there is none:
/// `snes9x_libretro_android.so` → `snes9x`, `mgba.so` → `mgba`.
pub fn libretro_name(core_file: &str) -> &str {
    let name = core_file.rsplit('/').next().unwrap_or(core_file);

    if let Some(end) = name.rfind("_libretro") {
        &name[..end]
    } else if let Some(end) = name.find('.') {
        &name[..end]
    } else {
        name
    }
}

/// Name of the `.info` file describing a core library or core archive.
///
/// `snes9x_libretro_android.so` → `snes9x_libretro.info`,
/// `mgba_libretro_android.so.zip` → `mgba_libretro.info`.
/// Returns `None` for names that are not core files.
pub fn info_file_name(core_file: &str) -> Option<String> {
    CORE_FILE_RE
        .captures(core_file)
        .map(|caps| format!("{}.info", &caps["stem"]))
}

/// One past the highest `firmware<N>_*` index present in `info`
fn firmware_slots(info: &ConfigFile) -> u64 {
    info.iter()
        .filter_map(|(key, _)| {
            let (index, _) = key.strip_prefix("firmware")?.split_once('_')?;
            index.parse::<u64>().ok()
        })
        .map(|index| index.saturating_add(1))
        .max()
        .unwrap_or(0)
}

fn info_path_for(info_dir: &Path, core_path: &Path) -> Option<PathBuf> {
    let file_name = core_path.file_name()?.to_str()?;
    info_file_name(file_name).map(|name| info_dir.join(name))
}

/// Picks a short core title out of a display name.
///
/// Display names look like `System (Core Name)`. The parenthesised part is
/// used when it is longer than `core_name`, otherwise `core_name` wins. With
/// no parenthesis or no core name the display name is returned unchanged.
pub fn best_core_title(display_name: &str, core_name: Option<&str>) -> String {
    let (Some(open), Some(core_name)) = (display_name.find(" ("), core_name) else {
        return display_name.to_string();
    };
    let start = open + 2;

    // Parenthesis at the very start gives no system part to strip
    if open > 0 {
        if let Some(end) = display_name.rfind(')') {
            if end > start {
                let inner = &display_name[start..end];
                if inner.chars().count() > core_name.chars().count() {
                    return inner.to_string();
                }
            }
        }
    }

    core_name.to_string()
}

/// Picks the system part of a display name.
///
/// `Nintendo - SNES / SFC (Snes9x)` → `Nintendo - SNES / SFC`. Falls back to
/// `system_name`, then to the display name itself.
pub fn best_system_title(display_name: &str, system_name: Option<&str>) -> String {
    match display_name.find(" (") {
        Some(idx) if idx > 1 => display_name[..idx].to_string(),
        _ => match system_name {
            Some(system) if !system.is_empty() => system.to_string(),
            _ => display_name.to_string(),
        },
    }
}
