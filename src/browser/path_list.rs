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

//! Prepared path lists
//!
//! Some content is picked from a text file of paths (one per line) instead
//! of by walking directories. A [`PathList`] shows those paths as file
//! entries in file order. There is no navigation, so choosing an entry is a
//! plain lookup.

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use super::{BrowseOutcome, BrowserError, Entry};
use crate::config::ConfigFile;

/// Archive extensions that take their title from the name table
const TITLED_EXTENSIONS: [&str; 2] = ["zip", "7z"];

/// File entries read from a path list
#[derive(Clone, Debug, Default)]
pub struct PathList {
    source: Option<PathBuf>,
    entries: Vec<Entry>,
}

impl PathList {
    /// Reads a path list file.
    ///
    /// # Errors
    ///
    /// `BrowserError::PathList` when the file cannot be read.
    pub fn load(path: impl AsRef<Path>, name_map: Option<&ConfigFile>) -> Result<Self, BrowserError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BrowserError::PathList {
            path: path.to_path_buf(),
            source,
        })?;

        let mut list = Self::parse(&String::from_utf8_lossy(&bytes), name_map);
        list.source = Some(path.to_path_buf());
        debug!(path = %path.display(), entries = list.entries.len(), "loaded path list");

        Ok(list)
    }

    /// Builds entries from list text; blank lines are skipped.
    ///
    /// Only `.zip` and `.7z` entries look up a title in `name_map`.
    pub fn parse(text: &str, name_map: Option<&ConfigFile>) -> Self {
        let entries = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim_start().is_empty())
            .map(|line| {
                let path = PathBuf::from(line);
                let titled = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| TITLED_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)));
                Entry::file(path, true, name_map.filter(|_| titled))
            })
            .collect();

        Self {
            source: None,
            entries,
        }
    }

    /// The list file, when loaded from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Entries in list order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The outcome of choosing the entry at `index`.
    pub fn select(&self, index: usize) -> Result<BrowseOutcome, BrowserError> {
        let entry = self
            .entries
            .get(index)
            .ok_or(BrowserError::NoSuchEntry(index))?;

        debug!(path = %entry.path().display(), "path list selected file");
        Ok(BrowseOutcome::File(entry.path().to_path_buf()))
    }
}
