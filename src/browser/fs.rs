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

//! Filesystem access used by the browser
//!
//! The browser only needs three questions answered: is this a directory,
//! what are its children, and which storage volumes exist. Keeping them
//! behind a trait lets tests drive the state machine without touching disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Filesystem operations the browser depends on.
pub trait FileSystem {
    /// `true` when `path` exists and is a directory (symlinks followed).
    fn is_dir(&self, path: &Path) -> bool;

    /// Full paths of the children of `dir`, in no particular order.
    ///
    /// An error stands for "no listing available" (permissions, a synthetic
    /// mount root), which the browser answers with the volume list.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Root directories of the mounted storage volumes
    fn storage_volumes(&self) -> Vec<PathBuf>;
}

/// [`FileSystem`] over `std::fs`.
#[derive(Clone, Debug)]
pub struct StdFileSystem {
    volumes: Vec<PathBuf>,
}

impl StdFileSystem {
    /// Uses the home directory plus the usual removable-media mount points.
    pub fn new() -> Self {
        Self {
            volumes: default_volumes(),
        }
    }

    /// Uses a fixed volume list instead of probing.
    pub fn with_volumes(volumes: Vec<PathBuf>) -> Self {
        Self { volumes }
    }
}

impl Default for StdFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for StdFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn storage_volumes(&self) -> Vec<PathBuf> {
        self.volumes.clone()
    }
}

fn default_volumes() -> Vec<PathBuf> {
    ["~", "/media", "/run/media", "/mnt"]
        .into_iter()
        .map(|raw| PathBuf::from(shellexpand::tilde(raw).into_owned()))
        .filter(|path| path.is_absolute() && path.is_dir())
        .collect()
}
