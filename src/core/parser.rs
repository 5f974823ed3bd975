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

//! src/core/parser.rs
//!
//! Line-oriented `key = "value"` parser
//!
//! This module parses the flat format shared by `retroarch.cfg` and core
//! `.info` files. It handles:
//! - Blank lines and `#` comments
//! - Splitting on the first `=` with whitespace trimmed on both sides
//! - One layer of surrounding double quotes on the value
//! - Line numbers for warnings
//!
//! # Architecture
//! Each line is classified on its own; a malformed line produces a
//! [`ParseWarning`] and parsing carries on with the next line. The parser
//! never touches the filesystem - `config::ConfigFile` owns I/O.

use nom::{
    bytes::complete::take_till1,
    character::complete::char,
    combinator::rest,
    IResult, Parser,
};
use thiserror::Error;

/// A single classified line of a config file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigLine<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// Line whose first non-whitespace character is `#`
    Comment(&'a str),
    /// A `key = value` pair, already trimmed and unquoted
    Entry { key: &'a str, value: &'a str },
}

/// Why a line was skipped
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WarningKind {
    /// No `=` separator on the line
    MissingSeparator,
    /// Nothing but whitespace before the `=`
    EmptyKey,
}

/// A malformed line that was skipped during parsing.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Skipped line {line} ({kind:?}): {content}")]
pub struct ParseWarning {
    /// 1-based line number
    pub line: usize,
    /// Raw line content
    pub content: String,
    pub kind: WarningKind,
}

/// Result of parsing a whole document: entries in file order plus warnings.
#[derive(Clone, Debug, Default)]
pub struct ParsedConfig {
    pub entries: Vec<(String, String)>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse a complete config document
///
/// Later duplicates are kept in `entries`; the store applies last-write-wins
/// when it inserts them.
///
/// # Example
/// ```
/// use phoenix_shell::core::parser::parse_config;
///
/// let parsed = parse_config("# video\nvideo_refresh_rate = \"59.94\"\n");
/// assert_eq!(parsed.entries, vec![("video_refresh_rate".to_string(), "59.94".to_string())]);
/// assert!(parsed.warnings.is_empty());
/// ```
pub fn parse_config(content: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            Ok(ConfigLine::Entry { key, value }) => {
                parsed.entries.push((key.to_string(), value.to_string()));
            }
            Ok(ConfigLine::Blank) | Ok(ConfigLine::Comment(_)) => {}
            Err(kind) => parsed.warnings.push(ParseWarning {
                line: idx + 1,
                content: line.to_string(),
                kind,
            }),
        }
    }

    parsed
}

/// Classify one line
///
/// Returns the [`WarningKind`] when the line is neither blank, a comment,
/// nor a well-formed entry.
pub fn parse_line(line: &str) -> Result<ConfigLine<'_>, WarningKind> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Ok(ConfigLine::Blank);
    }
    if let Some(comment) = trimmed.strip_prefix('#') {
        return Ok(ConfigLine::Comment(comment));
    }
    if trimmed.starts_with('=') {
        return Err(WarningKind::EmptyKey);
    }

    match parse_entry(trimmed) {
        Ok((_, (key, _))) if key.is_empty() => Err(WarningKind::EmptyKey),
        Ok((_, (key, value))) => Ok(ConfigLine::Entry { key, value }),
        Err(_) => Err(WarningKind::MissingSeparator),
    }
}

/// Parse `key = value`
///
/// Splits on the first `=`, so values may contain further `=` characters.
pub fn parse_entry(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (key, _, value)) =
        (take_till1(|c: char| c == '='), char('='), rest).parse(input)?;

    Ok((input, (key.trim(), unquote(value.trim()))))
}

/// Strip exactly one pair of surrounding double quotes
///
/// `"abc"` → `abc`, `""x""` → `"x"`, a lone `"` is left as is.
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
