// Copyright 2025 bakri (tidynest@proton.me)
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

//! Phoenix Shell
//!
//! Frontend-side plumbing for a libretro launcher: the `key = "value"`
//! config format shared by `retroarch.cfg` and core `.info` files, a
//! directory browser for picking content, and management of installed cores.
//!
//! # Features
//!
//! - **Config store:** Load, query, edit and atomically write config files
//! - **Backups:** Timestamped copies of the settings file with rollback
//! - **Core metadata:** Typed `.info` access, titles and firmware checks
//! - **Directory browser:** Back-stack navigation with extension filtering
//!   and a single terminal result
//! - **Core library:** List, remove, purge, back up and reinstall cores
//!
//! # Architecture
//!
//! - **`core`:** Line parser, shared value types, core metadata
//! - **`config`:** File operations (store, atomic writes, backups, settings)
//! - **`browser`:** Directory browser state machine over a `FileSystem`
//! - **`library`:** Installed core management and zip backups
//!
//! # Examples
//!
//! ## Reading a core's metadata
//!
//! ```no_run
//! use phoenix_shell::config::ConfigFile;
//! use phoenix_shell::core::CoreInfo;
//!
//! let info = ConfigFile::load("/data/phoenix/info/snes9x_libretro.info")?;
//! let info = CoreInfo::from_config(&info)?;
//! println!("{} ({})", info.core_title(), info.system_title());
//! for ext in info.supported_extensions.iter() {
//!     println!("  .{}", ext);
//! }
//! # Ok::<(), phoenix_shell::config::ConfigError>(())
//! ```
//!
//! ## Picking a directory
//!
//! ```no_run
//! use phoenix_shell::browser::{BrowseOptions, BrowseSession, StdFileSystem};
//!
//! let options = BrowseOptions::new().directory_target(true);
//! let mut session = BrowseSession::open(StdFileSystem::new(), None, options)?;
//! session.enter_directory("/media/roms")?;
//!
//! let outcome = session.select_directory();
//! println!("{}", outcome.into_path_string());
//! # Ok::<(), phoenix_shell::browser::BrowserError>(())
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod browser;
pub mod config;
pub mod core;
pub mod library;

// Re-export commonly used types for convenience
pub use browser::{BrowseOutcome, BrowseSession};
pub use config::ConfigFile;
pub use core::{CoreInfo, MultiValue};
