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

//! src/core/mod.rs
//!
//! Format-level logic with no filesystem side effects
//!
//! This module contains:
//! - The line parser for `key = "value"` files
//! - Shared value types (`MultiValue`, `FirmwareStatus`)
//! - Core `.info` metadata and the naming rules that tie a core library to
//!   its info file and settings prefix
//!
//! Everything that reads or writes files lives in `config` and `library`;
//! `core_info::CoreInfo::load` is the one convenience entry point that does.

pub mod core_info;
pub mod parser;
pub mod types;

pub use core_info::{
    best_core_title, best_system_title, info_file_name, libretro_name, CoreInfo, Firmware,
};
pub use types::*;

#[cfg(test)]
mod tests;
