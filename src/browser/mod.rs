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

//! Directory browser state machine
//!
//! A [`BrowseSession`] lists one directory at a time and keeps an explicit
//! back-stack of the directories that led there. Navigation methods take
//! `&mut self`; the three ways out ([`BrowseSession::select_file`],
//! [`BrowseSession::select_directory`], [`BrowseSession::cancel`]) take
//! `self`, so a session produces exactly one [`BrowseOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use phoenix_shell::browser::{BrowseOptions, BrowseSession, Step, StdFileSystem};
//!
//! let options = BrowseOptions::new().with_extensions(["sfc", "smc"]);
//! let mut session = BrowseSession::open(StdFileSystem::new(), Some("/roms".as_ref()), options)?;
//!
//! for entry in session.entries() {
//!     println!("{}", entry.display_name());
//! }
//!
//! match session.activate(2) {
//!     Ok(Step::Closed(outcome)) => println!("picked {}", outcome.into_path_string()),
//!     Ok(Step::Browsing(next)) => session = next,
//!     Err(rejected) => return Err(rejected.error),
//! }
//! # let _ = session;
//! # Ok::<(), phoenix_shell::browser::BrowserError>(())
//! ```

pub mod entry;
pub mod fs;
pub mod path_list;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt, mem,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConfigFile;
use entry::sort_entries;

pub use entry::{Entry, EntryKind};
pub use fs::{FileSystem, StdFileSystem};
pub use path_list::PathList;

/// Browser errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("No entry at index {0}")]
    NoSuchEntry(usize),

    #[error("Entry is disabled: {0}")]
    EntryDisabled(PathBuf),

    #[error("Saved session has an empty back-stack")]
    EmptyBackStack,

    #[error("Invalid saved session: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Cannot read path list {path}: {source}")]
    PathList {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One visited directory.
///
/// `parent_is_back` is set when the directory was reached by descending, so
/// "parent directory" can simply pop it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BackStackItem {
    pub path: PathBuf,
    pub parent_is_back: bool,
}

impl BackStackItem {
    pub fn new(path: impl Into<PathBuf>, parent_is_back: bool) -> Self {
        Self {
            path: path.into(),
            parent_is_back,
        }
    }
}

/// How a session filters and labels its listing
#[derive(Clone, Debug, Default)]
pub struct BrowseOptions {
    /// Lower-case extensions without the dot; empty means no filtering
    pub allowed_extensions: BTreeSet<String>,
    /// Adds "use this directory" and disables file entries
    pub directory_target: bool,
    /// Optional `basename = "Title"` table for file display names
    pub name_map: Option<ConfigFile>,
}

impl BrowseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts files to these extensions (case-insensitive, dot optional).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn directory_target(mut self, enabled: bool) -> Self {
        self.directory_target = enabled;
        self
    }

    pub fn with_name_map(mut self, name_map: ConfigFile) -> Self {
        self.name_map = Some(name_map);
        self
    }

    fn allows(&self, file: &Path) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }

        file.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.allowed_extensions.contains(&ext.to_ascii_lowercase()))
    }
}

/// Result of a finished session
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BrowseOutcome {
    File(PathBuf),
    Directory(PathBuf),
    Cancelled,
}

impl BrowseOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BrowseOutcome::File(path) | BrowseOutcome::Directory(path) => Some(path),
            BrowseOutcome::Cancelled => None,
        }
    }

    /// Chosen path as a string; empty for a cancelled session.
    pub fn into_path_string(self) -> String {
        match self {
            BrowseOutcome::File(path) | BrowseOutcome::Directory(path) => {
                path.to_string_lossy().into_owned()
            }
            BrowseOutcome::Cancelled => String::new(),
        }
    }
}

/// What [`BrowseSession::go_to_parent`] did
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParentStep {
    /// The top entry was popped and its parent is now listed
    Popped,
    /// The parent lies above the directory the session started in; nothing
    /// changed. [`BrowseSession::ascend_past_start`] goes there anyway.
    BeyondStart,
    /// The listed directory is a filesystem root; nothing changed
    AtFilesystemRoot,
}

/// Outcome of [`BrowseSession::activate`]
#[derive(Debug)]
pub enum Step<F: FileSystem> {
    Browsing(BrowseSession<F>),
    Closed(BrowseOutcome),
}

/// A failed [`BrowseSession::activate`]; the session comes back unchanged.
#[derive(Debug)]
pub struct Rejected<F: FileSystem> {
    pub session: BrowseSession<F>,
    pub error: BrowserError,
}

impl<F: FileSystem> Rejected<F> {
    pub fn into_error(self) -> BrowserError {
        self.error
    }
}

impl<F: FileSystem> fmt::Display for Rejected<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Serialisable copy of a session's navigation state.
///
/// The name table is not part of it; pass it again to
/// [`BrowseSession::restore`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionState {
    pub back_stack: Vec<BackStackItem>,
    pub directory_target: bool,
    pub allowed_extensions: BTreeSet<String>,
}

impl SessionState {
    pub fn to_json(&self) -> Result<String, BrowserError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, BrowserError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// An open directory browser.
///
/// The back-stack is never empty: `top` is the listed directory and
/// `history` holds everything below it.
#[derive(Debug)]
pub struct BrowseSession<F: FileSystem = StdFileSystem> {
    fs: F,
    options: BrowseOptions,
    history: Vec<BackStackItem>,
    top: BackStackItem,
    entries: Vec<Entry>,
}

impl<F: FileSystem> BrowseSession<F> {
    /// Opens a session at `start`.
    ///
    /// Without a start directory the first storage volume is used, or `/`
    /// when the filesystem reports none.
    ///
    /// # Returns
    ///
    /// * `Ok(BrowseSession)` - Listing of the start directory is ready
    /// * `Err(BrowserError::InvalidDirectory)` - Start is not a directory
    pub fn open(fs: F, start: Option<&Path>, options: BrowseOptions) -> Result<Self, BrowserError> {
        let start = match start {
            Some(path) => path.to_path_buf(),
            None => fs
                .storage_volumes()
                .into_iter()
                .next()
                .unwrap_or_else(|| PathBuf::from("/")),
        };

        let mut session = Self {
            fs,
            options,
            history: Vec::new(),
            top: BackStackItem::new(start, false),
            entries: Vec::new(),
        };
        session.refresh()?;

        Ok(session)
    }

    /// Rebuilds a session from a [`SessionState`].
    pub fn restore(
        fs: F,
        state: SessionState,
        name_map: Option<ConfigFile>,
    ) -> Result<Self, BrowserError> {
        let mut back_stack = state.back_stack;
        let top = back_stack.pop().ok_or(BrowserError::EmptyBackStack)?;

        let mut session = Self {
            fs,
            options: BrowseOptions {
                allowed_extensions: state.allowed_extensions,
                directory_target: state.directory_target,
                name_map,
            },
            history: back_stack,
            top,
            entries: Vec::new(),
        };
        session.refresh()?;

        Ok(session)
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            back_stack: self.back_stack().cloned().collect(),
            directory_target: self.options.directory_target,
            allowed_extensions: self.options.allowed_extensions.clone(),
        }
    }

    /// The listed directory
    pub fn current_dir(&self) -> &Path {
        &self.top.path
    }

    /// Current listing, already sorted
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn options(&self) -> &BrowseOptions {
        &self.options
    }

    /// Back-stack from the start directory up to the listed one
    pub fn back_stack(&self) -> impl Iterator<Item = &BackStackItem> {
        self.history.iter().chain(std::iter::once(&self.top))
    }

    pub fn depth(&self) -> usize {
        self.history.len() + 1
    }

    /// Re-lists the current directory.
    pub fn refresh(&mut self) -> Result<(), BrowserError> {
        self.entries = self.list(&self.top.path)?;
        Ok(())
    }

    /// Descends into `path`.
    ///
    /// # Errors
    ///
    /// `BrowserError::InvalidDirectory` if `path` is not a directory; the
    /// session is left as it was.
    pub fn enter_directory(&mut self, path: impl Into<PathBuf>) -> Result<(), BrowserError> {
        self.push(BackStackItem::new(path, true))
    }

    /// Handles the "parent directory" entry.
    ///
    /// Pops the back-stack when the listed directory was reached by
    /// descending. Otherwise reports why nothing happened.
    pub fn go_to_parent(&mut self) -> Result<ParentStep, BrowserError> {
        if self.top.parent_is_back && !self.history.is_empty() {
            self.pop()?;
            return Ok(ParentStep::Popped);
        }

        if self.top.path.parent().is_none() {
            Ok(ParentStep::AtFilesystemRoot)
        } else {
            Ok(ParentStep::BeyondStart)
        }
    }

    /// Moves above the current directory without popping.
    ///
    /// The parent is pushed as a non-descended entry, so "parent directory"
    /// keeps climbing from there.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The parent is now listed
    /// * `Ok(false)` - Already at a filesystem root
    pub fn ascend_past_start(&mut self) -> Result<bool, BrowserError> {
        let Some(parent) = self.top.path.parent().map(Path::to_path_buf) else {
            return Ok(false);
        };

        self.push(BackStackItem::new(parent, false))?;
        Ok(true)
    }

    /// Back key: returns to the previously listed directory.
    ///
    /// Returns `false` when only the start entry is left.
    pub fn back(&mut self) -> Result<bool, BrowserError> {
        if self.history.is_empty() {
            return Ok(false);
        }

        self.pop()?;
        Ok(true)
    }

    /// Acts on the entry at `index` the way a click would.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Browsing)` - Navigation happened, keep browsing
    /// * `Ok(Step::Closed)` - A file or "use this directory" was chosen
    /// * `Err(Rejected)` - Bad index, disabled entry or vanished directory;
    ///   the unchanged session is handed back
    pub fn activate(mut self, index: usize) -> Result<Step<F>, Rejected<F>> {
        let Some(entry) = self.entries.get(index).cloned() else {
            return Err(self.reject(BrowserError::NoSuchEntry(index)));
        };

        if !entry.is_enabled() {
            return Err(self.reject(BrowserError::EntryDisabled(entry.path().to_path_buf())));
        }

        let navigated = match entry.kind() {
            EntryKind::UseThisDirectory => return Ok(Step::Closed(self.select_directory())),
            EntryKind::File => return Ok(Step::Closed(self.select_file(entry.path()))),
            EntryKind::Directory => self.enter_directory(entry.path()),
            EntryKind::Parent => match self.go_to_parent() {
                Ok(ParentStep::BeyondStart) => self.ascend_past_start().map(|_| ()),
                other => other.map(|_| ()),
            },
        };

        match navigated {
            Ok(()) => Ok(Step::Browsing(self)),
            Err(error) => Err(self.reject(error)),
        }
    }

    /// Finishes with a chosen file.
    pub fn select_file(self, path: impl Into<PathBuf>) -> BrowseOutcome {
        let path = path.into();
        debug!(path = %path.display(), "browser selected file");
        BrowseOutcome::File(path)
    }

    /// Finishes with the listed directory.
    pub fn select_directory(self) -> BrowseOutcome {
        debug!(path = %self.top.path.display(), "browser selected directory");
        BrowseOutcome::Directory(self.top.path)
    }

    /// Finishes without a choice.
    pub fn cancel(self) -> BrowseOutcome {
        BrowseOutcome::Cancelled
    }

    fn reject(self, error: BrowserError) -> Rejected<F> {
        Rejected {
            session: self,
            error,
        }
    }

    fn push(&mut self, item: BackStackItem) -> Result<(), BrowserError> {
        let entries = self.list(&item.path)?;

        self.history.push(mem::replace(&mut self.top, item));
        self.entries = entries;
        Ok(())
    }

    fn pop(&mut self) -> Result<(), BrowserError> {
        let Some(below) = self.history.last() else {
            return Ok(());
        };
        let entries = self.list(&below.path)?;

        if let Some(below) = self.history.pop() {
            self.top = below;
        }
        self.entries = entries;
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>, BrowserError> {
        if !self.fs.is_dir(dir) {
            return Err(BrowserError::InvalidDirectory(dir.to_path_buf()));
        }

        let mut entries = Vec::new();

        if self.options.directory_target {
            entries.push(Entry::use_this_directory(dir));
        }
        if let Some(parent) = dir.parent() {
            entries.push(Entry::parent(parent));
        }

        match self.fs.read_dir(dir) {
            Ok(children) => {
                for child in children {
                    if self.fs.is_dir(&child) {
                        entries.push(Entry::directory(child));
                    } else if self.options.allows(&child) {
                        entries.push(Entry::file(
                            child,
                            !self.options.directory_target,
                            self.options.name_map.as_ref(),
                        ));
                    }
                }
            }
            Err(e) => {
                let volumes = self.fs.storage_volumes();
                warn!(
                    dir = %dir.display(),
                    error = %e,
                    volumes = volumes.len(),
                    "directory listing unavailable, showing storage volumes"
                );
                if !volumes.is_empty() {
                    entries = volumes.into_iter().map(Entry::volume).collect();
                }
            }
        }

        sort_entries(&mut entries);
        debug!(dir = %dir.display(), entries = entries.len(), "listed directory");

        Ok(entries)
    }
}

#[cfg(test)]
mod tests;
