//! Browser module tests
//!
//! Contains test suites for the directory browser:
//! - Session navigation against an in-memory filesystem
//! - Listing and selection against a real temp directory
//! - Prepared path lists

#[cfg(test)]
mod std_fs_tests;

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
};

use crate::browser::{Entry, EntryKind, FileSystem};

/// In-memory filesystem: a set of directories and files, some of which can
/// refuse to be listed.
#[derive(Debug, Default)]
pub(super) struct MemoryFs {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
    volumes: Vec<PathBuf>,
}

impl MemoryFs {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Adds a directory and all its ancestors
    pub(super) fn dir(mut self, path: &str) -> Self {
        self.add_ancestors(Path::new(path));
        self.dirs.insert(PathBuf::from(path));
        self
    }

    pub(super) fn file(mut self, path: &str) -> Self {
        self.add_ancestors(Path::new(path));
        self.files.insert(PathBuf::from(path));
        self
    }

    pub(super) fn unreadable(mut self, path: &str) -> Self {
        self = self.dir(path);
        self.unreadable.insert(PathBuf::from(path));
        self
    }

    pub(super) fn volume(mut self, path: &str) -> Self {
        self = self.dir(path);
        self.volumes.push(PathBuf::from(path));
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FileSystem for MemoryFs {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if self.unreadable.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "unreadable"));
        }
        if !self.dirs.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }

        Ok(self
            .dirs
            .iter()
            .chain(self.files.iter())
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn storage_volumes(&self) -> Vec<PathBuf> {
        self.volumes.clone()
    }
}

/// Helper: `(kind, display name)` of every entry, in listing order
pub(super) fn summary(entries: &[Entry]) -> Vec<(EntryKind, String)> {
    entries
        .iter()
        .map(|e| (e.kind(), e.display_name().to_string()))
        .collect()
}
