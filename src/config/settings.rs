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

//! Frontend settings and their projection into `retroarch.cfg`
//!
//! The frontend keeps its own preference set (a JSON file) and mirrors a
//! subset of it into the runtime's `retroarch.cfg`:
//!
//! - [`Settings::apply_to`] writes frontend values into the config store
//! - [`Settings::read_back`] pulls the runtime-editable keys back
//!
//! Directory settings follow an override pattern: each has an enable flag and
//! a custom path, and resolves to `<base_dir>/<name>` otherwise.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::{write_atomic, ConfigError, ConfigFile};

/// Default audio latency in milliseconds
pub const DEFAULT_AUDIO_LATENCY: u32 = 64;

/// Name of the default backup-cores directory under the base directory
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_BACKUP_CORES_DIR: &str = "cores64";
#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_BACKUP_CORES_DIR: &str = "cores32";

/// A directory that can be overridden by the user
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DirOverride {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl DirOverride {
    pub fn custom(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: Some(path.into()),
        }
    }

    /// Custom path when enabled and set, `default` otherwise
    pub fn resolve(&self, default: PathBuf) -> PathBuf {
        match (&self.path, self.enabled) {
            (Some(path), true) => path.clone(),
            _ => default,
        }
    }
}

/// Audio parameters reported by the platform
///
/// Both values are optional; unknown values are simply not written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AudioHints {
    /// Native output sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Low-latency buffer size in frames
    pub block_frames: Option<u32>,
}

/// Frontend preference set
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Root the default directories are derived from
    pub base_dir: PathBuf,
    /// Initial directory of the content browser (`rgui_browser_directory`)
    pub rom_directory: String,
    pub audio_latency_auto: bool,
    /// Fixed latency in ms, used when `audio_latency_auto` is off
    pub audio_latency: u32,
    /// Empty string lets the runtime measure it
    pub video_refresh_rate: String,
    pub savefile_directory: DirOverride,
    pub savestate_directory: DirOverride,
    pub system_directory: DirOverride,
    pub config_directory: DirOverride,
    pub backup_cores_directory: DirOverride,
    /// Show MAME titles instead of ROM set names
    pub mame_titles: bool,
    /// Title installed cores by system instead of by core
    pub sort_cores_by_system: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(shellexpand::tilde("~/RetroArch").as_ref()),
            rom_directory: String::new(),
            audio_latency_auto: true,
            audio_latency: DEFAULT_AUDIO_LATENCY,
            video_refresh_rate: String::new(),
            savefile_directory: DirOverride::default(),
            savestate_directory: DirOverride::default(),
            system_directory: DirOverride::default(),
            config_directory: DirOverride::default(),
            backup_cores_directory: DirOverride::default(),
            mame_titles: false,
            sort_cores_by_system: true,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// A missing file yields defaults. Missing fields take their defaults, so
    /// older settings files keep loading.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file missing, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Saves settings as pretty-printed JSON, atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
    }

    pub fn savefile_dir(&self) -> PathBuf {
        self.savefile_directory.resolve(self.base_dir.join("save"))
    }

    pub fn savestate_dir(&self) -> PathBuf {
        self.savestate_directory.resolve(self.base_dir.join("state"))
    }

    pub fn system_dir(&self) -> PathBuf {
        self.system_directory.resolve(self.base_dir.join("system"))
    }

    /// Holds core options, per-game configs and input remaps
    pub fn config_dir(&self) -> PathBuf {
        self.config_directory.resolve(self.base_dir.join("config"))
    }

    pub fn backup_cores_dir(&self) -> PathBuf {
        self.backup_cores_directory
            .resolve(self.base_dir.join(DEFAULT_BACKUP_CORES_DIR))
    }

    /// Writes the frontend-owned keys into `config`.
    ///
    /// Existing unrelated keys are left alone.
    pub fn apply_to(&self, config: &mut ConfigFile, audio: AudioHints) {
        config.set_string("rgui_browser_directory", self.rom_directory.as_str());

        if let Some(rate) = audio.sample_rate {
            config.set_int("audio_out_rate", i64::from(rate));
        }
        if self.audio_latency_auto {
            if let Some(frames) = audio.block_frames {
                config.set_int("audio_block_frames", i64::from(frames));
            }
        } else {
            config.set_int("audio_latency", i64::from(self.audio_latency));
        }
        config.set_string("video_refresh_rate", self.video_refresh_rate.as_str());

        config.set_string("savefile_directory", path_string(&self.savefile_dir()));
        config.set_string("savestate_directory", path_string(&self.savestate_dir()));
        config.set_string("system_directory", path_string(&self.system_dir()));

        let config_dir = path_string(&self.config_dir());
        config.set_string("rgui_config_directory", config_dir.as_str());
        config.set_string("input_remapping_directory", config_dir);

        config.set_bool("mame_titles", self.mame_titles);
    }

    /// Creates every resolved directory that `apply_to` points the runtime at.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        for dir in [
            self.savefile_dir(),
            self.savestate_dir(),
            self.system_dir(),
            self.config_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Copies runtime-editable keys from `config` back into the settings.
    ///
    /// Keys missing from `config` reset the field to its default.
    ///
    /// # Errors
    ///
    /// `ConfigError::TypeMismatch` when a present value has the wrong type.
    pub fn read_back(&mut self, config: &ConfigFile) -> Result<(), ConfigError> {
        let defaults = Self::default();

        let audio_latency = if config.key_exists("audio_latency") {
            let latency = config.get_int("audio_latency")?;
            u32::try_from(latency).map_err(|_| ConfigError::TypeMismatch {
                key: "audio_latency".to_string(),
                value: latency.to_string(),
                expected: "non-negative integer",
            })?
        } else {
            defaults.audio_latency
        };

        let video_refresh_rate = config
            .get_string("video_refresh_rate")
            .map(str::to_string)
            .unwrap_or(defaults.video_refresh_rate);

        let mame_titles = if config.key_exists("mame_titles") {
            config.get_bool("mame_titles")?
        } else {
            defaults.mame_titles
        };

        // All keys parsed; nothing is assigned on a type error
        self.audio_latency = audio_latency;
        self.video_refresh_rate = video_refresh_rate;
        self.mame_titles = mame_titles;

        info!("read back settings from config");
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
