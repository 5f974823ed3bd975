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

use std::fs;
use tempfile::TempDir;

use crate::config::{ConfigError, ConfigFile};
use crate::core::parser::WarningKind;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_skips_comments_and_blank_lines() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("retroarch.cfg");
    fs::write(
        &path,
        "# Frontend settings\n\n   # indented comment\naudio_latency = \"64\"\nvideo_refresh_rate = 59.94\n",
    )
    .unwrap();

    let config = ConfigFile::load(&path).unwrap();

    assert_eq!(config.len(), 2);
    assert_eq!(config.get_string("audio_latency"), Some("64"));
    assert_eq!(config.get_string("video_refresh_rate"), Some("59.94"));
    assert_eq!(config.path(), Some(path.as_path()));
}

#[test]
fn test_load_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nonexistent.cfg");

    let config = ConfigFile::load(&path).unwrap();

    assert!(config.is_empty(), "Missing file should behave like an empty config");
    assert!(!config.key_exists("anything"));
}

#[test]
fn test_load_directory_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let result = ConfigFile::load(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_twice_is_identical() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("snes9x_libretro.info");
    fs::write(
        &path,
        "display_name = \"Nintendo - SNES / SFC (Snes9x)\"\nauthors = \"Snes9x Team\"\n",
    )
    .unwrap();

    let first = ConfigFile::load(&path).unwrap();
    let second = ConfigFile::load(&path).unwrap();

    let first: Vec<_> = first.iter().collect();
    let second: Vec<_> = second.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_load_tolerates_invalid_utf8() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("latin1.info");
    fs::write(&path, b"authors = \"Fran\xe7ois\"\ncorename = \"x\"\n").unwrap();

    let config = ConfigFile::load(&path).unwrap();

    assert_eq!(config.get_string("corename"), Some("x"));
    assert!(config.get_string("authors").unwrap().starts_with("Fran"));
}

// ============================================================================
// Parsing rules
// ============================================================================

#[test]
fn test_parse_splits_on_first_equals() {
    let config = ConfigFile::parse("cheat_code = \"a=b=c\"\n");
    assert_eq!(config.get_string("cheat_code"), Some("a=b=c"));
}

#[test]
fn test_parse_strips_one_layer_of_quotes() {
    let config = ConfigFile::parse("a = \"\"quoted\"\"\nb = \"\nc = \"\"\n");

    assert_eq!(config.get_string("a"), Some("\"quoted\""));
    assert_eq!(config.get_string("b"), Some("\""), "Lone quote is kept");
    assert_eq!(config.get_string("c"), Some(""));
}

#[test]
fn test_parse_empty_value_differs_from_missing() {
    let config = ConfigFile::parse("video_refresh_rate = \"\"\n");

    assert!(config.key_exists("video_refresh_rate"));
    assert_eq!(config.get_string("video_refresh_rate"), Some(""));
    assert_eq!(config.get_string("audio_latency"), None);
}

#[test]
fn test_parse_last_write_wins() {
    let config = ConfigFile::parse("input_driver = sdl\ninput_driver = udev\n");

    assert_eq!(config.len(), 1);
    assert_eq!(config.get_string("input_driver"), Some("udev"));
}

#[test]
fn test_parse_keys_are_case_sensitive() {
    let config = ConfigFile::parse("Key = upper\nkey = lower\n");

    assert_eq!(config.get_string("Key"), Some("upper"));
    assert_eq!(config.get_string("key"), Some("lower"));
    assert_eq!(config.get_string("KEY"), None);
}

#[test]
fn test_parse_malformed_lines_become_warnings() {
    let config = ConfigFile::parse("good = 1\nthis line has no separator\n = orphan\nalso_good = 2\n");

    assert_eq!(config.len(), 2, "Parsing should continue past bad lines");

    let warnings = config.warnings();
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].line, 2);
    assert_eq!(warnings[0].kind, WarningKind::MissingSeparator);
    assert_eq!(warnings[1].line, 3);
    assert_eq!(warnings[1].kind, WarningKind::EmptyKey);
}

// ============================================================================
// Typed getters
// ============================================================================

#[test]
fn test_typed_getters() {
    let config = ConfigFile::parse(
        "audio_latency = \"64\"\nvideo_refresh_rate = \"59.94\"\nmame_titles = \"TRUE\"\nvsync = False\n",
    );

    assert_eq!(config.get_int("audio_latency").unwrap(), 64);
    assert!((config.get_double("video_refresh_rate").unwrap() - 59.94).abs() < f64::EPSILON);
    assert!(config.get_bool("mame_titles").unwrap());
    assert!(!config.get_bool("vsync").unwrap());
}

#[test]
fn test_typed_getter_conversion_failure() {
    let config = ConfigFile::parse("audio_latency = fast\nmame_titles = yes\n");

    match config.get_int("audio_latency") {
        Err(ConfigError::TypeMismatch { key, value, expected }) => {
            assert_eq!(key, "audio_latency");
            assert_eq!(value, "fast");
            assert_eq!(expected, "integer");
        }
        other => panic!("Expected TypeMismatch, got: {:?}", other),
    }

    assert!(matches!(
        config.get_bool("mame_titles"),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_typed_getter_missing_key() {
    let config = ConfigFile::new();

    assert!(matches!(
        config.get_int("firmware_count"),
        Err(ConfigError::MissingKey(key)) if key == "firmware_count"
    ));
}

// ============================================================================
// Mutation
// ============================================================================

#[test]
fn test_setters_overwrite() {
    let mut config = ConfigFile::parse("audio_latency = 32\n");

    config.set_int("audio_latency", 128);
    config.set_bool("mame_titles", false);
    config.set_double("video_refresh_rate", 60.0);
    config.set_string("system_directory", "/srv/bios");

    assert_eq!(config.get_int("audio_latency").unwrap(), 128);
    assert_eq!(config.get_string("mame_titles"), Some("false"));
    assert_eq!(config.get_double("video_refresh_rate").unwrap(), 60.0);
    assert_eq!(config.get_string("system_directory"), Some("/srv/bios"));
}

#[test]
fn test_remove_keys_with_prefix() {
    let mut config: ConfigFile = [("foo_x", "1"), ("foo_y", "2"), ("bar", "3")]
        .into_iter()
        .collect();

    let removed = config.remove_keys_with_prefix("foo_");

    assert_eq!(removed, 2);
    let remaining: Vec<_> = config.iter().collect();
    assert_eq!(remaining, vec![("bar", "3")]);
}

#[test]
fn test_get_multi_follows_pipe_convention() {
    let config = ConfigFile::parse("authors = \"a|b|c\"\nlicense = \"GPLv2\"\nnotes = \"\"\n");

    assert_eq!(config.get_multi("authors").items(), ["a", "b", "c"]);
    assert_eq!(config.get_multi("license").items(), ["GPLv2"]);
    assert!(config.get_multi("notes").is_empty());
    assert!(config.get_multi("permissions").is_empty());
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("retroarch.cfg");

    let mut config = ConfigFile::new();
    config.set_string("video_refresh_rate", "59.94");
    config.set_int("audio_latency", 64);
    config.write(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "audio_latency = \"64\"\nvideo_refresh_rate = \"59.94\"\n"
    );
}

#[test]
fn test_write_then_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("roundtrip.cfg");

    let original: ConfigFile = [
        ("supported_extensions", "smc|sfc|swc|fig"),
        ("empty", ""),
        ("spaces", "  padded value  "),
        ("quoted", "\"already quoted\""),
        ("equals", "a=b"),
        ("hash", "#not a comment"),
        ("unicode", "ポケモン"),
    ]
    .into_iter()
    .collect();

    original.write(&path).unwrap();
    let reloaded = ConfigFile::load(&path).unwrap();

    let a: Vec<_> = original.iter().collect();
    let b: Vec<_> = reloaded.iter().collect();
    assert_eq!(a, b);
    assert!(reloaded.warnings().is_empty());
}

#[test]
fn test_write_rejects_unserialisable_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("retroarch.cfg");
    fs::write(&path, "keep = \"me\"\n").unwrap();

    for (key, value) in [
        ("", "x"),
        ("a=b", "x"),
        (" padded", "x"),
        ("#comment", "x"),
        ("line\nbreak", "x"),
        ("ok", "multi\nline"),
    ] {
        let mut config = ConfigFile::new();
        config.set_string(key, value);

        let result = config.write(&path);
        assert!(
            matches!(result, Err(ConfigError::InvalidEntry { .. })),
            "Entry {:?} = {:?} should be rejected",
            key,
            value
        );
    }

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "keep = \"me\"\n",
        "Rejected write must not touch the existing file"
    );
}

#[test]
fn test_write_to_missing_directory_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no_such_dir").join("retroarch.cfg");

    let mut config = ConfigFile::new();
    config.set_string("a", "b");

    assert!(matches!(config.write(&path), Err(ConfigError::WriteFailed(_))));
    assert!(!path.exists());
}
