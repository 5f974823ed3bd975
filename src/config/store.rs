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

//! In-memory key/value store backed by a `key = "value"` file
//!
//! [`ConfigFile`] is the one type every other module reads settings and core
//! metadata through. It is deliberately dumb: string keys, string values,
//! typed conversions on demand, and a whole-file atomic write.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::config::{write_atomic, ConfigError};
use crate::core::parser::{parse_config, ParseWarning};
use crate::core::MultiValue;

/// Flat string-keyed configuration.
///
/// Keys are case-sensitive. Entries are kept sorted by key, which is also the
/// order [`ConfigFile::write`] emits them in.
///
/// Not thread-safe: callers serialise access to any given path.
///
/// # Example
///
/// ```
/// use phoenix_shell::config::ConfigFile;
///
/// let mut cfg = ConfigFile::parse("audio_latency = \"64\"\n# comment\n");
/// assert_eq!(cfg.get_int("audio_latency")?, 64);
///
/// cfg.set_bool("mame_titles", true);
/// assert!(cfg.get_bool("mame_titles")?);
/// # Ok::<(), phoenix_shell::config::ConfigError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigFile {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
    warnings: Vec<ParseWarning>,
}

impl ConfigFile {
    /// Creates an empty store with no backing path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a config file from disk.
    ///
    /// A file that does not exist loads as an empty store, so callers can
    /// treat "no config yet" like "nothing configured". Malformed lines are
    /// skipped, logged and kept in [`ConfigFile::warnings`]. Invalid UTF-8 is
    /// replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` for any read failure other than not-found.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file missing, using empty store");
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                });
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let mut config = Self::parse(&String::from_utf8_lossy(&bytes));
        config.path = Some(path.to_path_buf());

        for warning in &config.warnings {
            warn!(path = %path.display(), "{}", warning);
        }
        debug!(path = %path.display(), entries = config.len(), "loaded config");

        Ok(config)
    }

    /// Parses config text that is already in memory.
    pub fn parse(content: &str) -> Self {
        let parsed = parse_config(content);

        Self {
            entries: parsed.entries.into_iter().collect(),
            path: None,
            warnings: parsed.warnings,
        }
    }

    /// Path this store was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines skipped during the last parse
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn key_exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw string value; `None` only when the key is absent.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| type_mismatch(key, value, "integer"))
    }

    pub fn get_double(&self, key: &str) -> Result<f64, ConfigError> {
        let value = self.require(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| type_mismatch(key, value, "number"))
    }

    /// Accepts `true`/`false` in any letter case.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(key)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(type_mismatch(key, value, "boolean")),
        }
    }

    /// Splits a `|`-delimited value; a missing key gives an empty list.
    pub fn get_multi(&self, key: &str) -> MultiValue {
        MultiValue::from_optional(self.get_string(key))
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set_string(key, value.to_string());
    }

    pub fn set_double(&mut self, key: impl Into<String>, value: f64) {
        self.set_string(key, value.to_string());
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set_string(key, if value { "true" } else { "false" });
    }

    /// Removes one key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Used to purge all settings that belong to one core
    /// (e.g. prefix `snes9x_`). Returns the number of removed entries.
    pub fn remove_keys_with_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Renders every entry as `key = "value"` lines.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidEntry` if any entry would not survive a reload
    /// unchanged (see [`validate_entry`]).
    pub fn to_config_string(&self) -> Result<String, ConfigError> {
        let mut out = String::new();

        for (key, value) in &self.entries {
            validate_entry(key, value)?;
            out.push_str(key);
            out.push_str(" = \"");
            out.push_str(value);
            out.push_str("\"\n");
        }

        Ok(out)
    }

    /// Writes all entries to `path`, replacing the file atomically.
    ///
    /// The content is rendered first, so an invalid entry aborts before the
    /// target is touched. The write goes through a temp file and rename; a
    /// failure leaves the previous file intact.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_config_string()?;

        write_atomic(path, content.as_bytes())?;
        info!(path = %path.display(), entries = self.len(), "wrote config");

        Ok(())
    }

    fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get_string(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigFile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }
}

/// Checks that `key = "value"` reads back as the same pair.
pub fn validate_entry(key: &str, value: &str) -> Result<(), ConfigError> {
    let reason = if key.is_empty() {
        Some("empty key")
    } else if key.contains('=') {
        Some("key contains '='")
    } else if key.contains(['\n', '\r']) {
        Some("key contains a line break")
    } else if key.trim() != key {
        Some("key has surrounding whitespace")
    } else if key.starts_with('#') {
        Some("key starts with a comment marker")
    } else if value.contains(['\n', '\r']) {
        Some("value contains a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidEntry {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn type_mismatch(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}
