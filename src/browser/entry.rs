//! src/browser/entry.rs
//!
//! One row of a directory listing and the order rows are shown in.

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use crate::config::ConfigFile;

/// Label of the synthetic entry that selects the listed directory
pub const USE_THIS_DIRECTORY_LABEL: &str = "[[Use this directory]]";
/// Label of the synthetic entry that leads to the parent directory
pub const PARENT_DIRECTORY_LABEL: &str = "[Parent Directory]";

/// What a listing row stands for.
///
/// Declaration order is the display rank.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum EntryKind {
    UseThisDirectory,
    Parent,
    Directory,
    File,
}

/// A single row in a [`super::BrowseSession`] listing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    kind: EntryKind,
    path: PathBuf,
    display_name: String,
    enabled: bool,
}

impl Entry {
    pub(crate) fn use_this_directory(dir: &Path) -> Self {
        Self {
            kind: EntryKind::UseThisDirectory,
            path: dir.to_path_buf(),
            display_name: USE_THIS_DIRECTORY_LABEL.to_string(),
            enabled: true,
        }
    }

    pub(crate) fn parent(parent: &Path) -> Self {
        Self {
            kind: EntryKind::Parent,
            path: parent.to_path_buf(),
            display_name: PARENT_DIRECTORY_LABEL.to_string(),
            enabled: true,
        }
    }

    pub(crate) fn directory(path: PathBuf) -> Self {
        Self {
            kind: EntryKind::Directory,
            display_name: file_name_lossy(&path),
            path,
            enabled: true,
        }
    }

    /// A storage volume root, shown by its full path
    pub(crate) fn volume(path: PathBuf) -> Self {
        Self {
            kind: EntryKind::Directory,
            display_name: path.display().to_string(),
            path,
            enabled: true,
        }
    }

    pub(crate) fn file(path: PathBuf, enabled: bool, name_map: Option<&ConfigFile>) -> Self {
        let file_name = file_name_lossy(&path);
        let display_name = match name_map {
            Some(map) => mapped_name(&file_name, map),
            None => file_name,
        };

        Self {
            kind: EntryKind::File,
            path,
            display_name,
            enabled,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Target of the entry: the listed directory for "use this directory",
    /// the parent for "parent directory", otherwise the child itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Listing order: enabled first, then kind rank, then display name.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        other
            .enabled
            .cmp(&self.enabled)
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.display_name.cmp(&other.display_name))
    }
}

/// Friendly title for `file_name` from a name table.
///
/// The table is keyed by the file name up to its last `.`; a leading dot does
/// not count as an extension. Unmapped names are returned unchanged.
///
/// ```
/// use phoenix_shell::browser::entry::mapped_name;
/// use phoenix_shell::config::ConfigFile;
///
/// let titles = ConfigFile::parse("sf2 = \"Street Fighter II\"\n");
/// assert_eq!(mapped_name("sf2.zip", &titles), "Street Fighter II");
/// assert_eq!(mapped_name("mslug.zip", &titles), "mslug.zip");
/// ```
pub fn mapped_name(file_name: &str, name_map: &ConfigFile) -> String {
    let basename = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };

    name_map
        .get_string(basename)
        .unwrap_or(file_name)
        .to_string()
}

pub(crate) fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(Entry::listing_order);
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
