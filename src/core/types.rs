//! src/core/types.rs
//!
//! Shared value types for config metadata
//!
//! This module defines:
//! - `MultiValue`: the `|`-delimited list convention used by `.info` fields
//! - `FirmwareStatus`: presence state of a firmware file a core expects
//!
//! The config store itself only knows strings; these types sit on top of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter for list-valued metadata fields
pub const MULTI_VALUE_DELIMITER: char = '|';

/// A `|`-delimited list stored in a single config value
///
/// Used for `manufacturer`, `license`, `authors`, `supported_extensions`,
/// `required_hw_api`, `permissions` and `notes`.
///
/// An absent or empty value is an empty list. A value without any `|` is a
/// one-element list.
///
/// # Example
/// ```
/// use phoenix_shell::core::MultiValue;
///
/// let authors = MultiValue::parse("byuu|Near");
/// assert_eq!(authors.items(), ["byuu", "Near"]);
/// assert_eq!(MultiValue::parse("GPLv3").items(), ["GPLv3"]);
/// assert!(MultiValue::parse("").is_empty());
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MultiValue(Vec<String>);

impl MultiValue {
    /// Split a raw config value on `|`
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }

        Self(
            raw.split(MULTI_VALUE_DELIMITER)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Split an optional value, treating a missing key like an empty value
    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Items joined with `sep`, or `fallback` when the list is empty
    pub fn display_or(&self, sep: &str, fallback: &str) -> String {
        if self.0.is_empty() {
            fallback.to_string()
        } else {
            self.0.join(sep)
        }
    }

    /// Serialise back to the single-string form
    pub fn to_config_value(&self) -> String {
        self.0.join(&MULTI_VALUE_DELIMITER.to_string())
    }
}

impl<S: Into<String>> FromIterator<S> for MultiValue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for MultiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config_value())
    }
}

/// Presence of one firmware file inside the system directory
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum FirmwareStatus {
    Present,
    /// Missing, but the core runs without it
    MissingOptional,
    /// Missing and the core needs it
    MissingRequired,
}

impl FirmwareStatus {
    /// Marker used in firmware listings
    pub fn marker(&self) -> char {
        match self {
            FirmwareStatus::Present => '+',
            FirmwareStatus::MissingOptional => '-',
            FirmwareStatus::MissingRequired => '!',
        }
    }
}

impl fmt::Display for FirmwareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareStatus::Present => write!(f, "present"),
            FirmwareStatus::MissingOptional => write!(f, "missing, optional"),
            FirmwareStatus::MissingRequired => write!(f, "missing, required"),
        }
    }
}
