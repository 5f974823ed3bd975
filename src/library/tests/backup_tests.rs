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

//! Backup and install tests
//!
//! Backups are real zip archives written into the fixture directory; the
//! install side reads them back with `zip::ZipArchive`.

use std::{fs, fs::File, io::Read};

use super::{Fixture, SNES9X_INFO};
use crate::library::*;

/// Helper: names and contents of every file in a zip
fn zip_contents(path: &std::path::Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        out.push((entry.name().to_string(), data));
    }
    out.sort();
    out
}

// ============================================================================
// Backup
// ============================================================================

#[test]
fn test_backup_core_with_info() {
    let fixture = Fixture::new();
    let core = fixture.add_core(
        "snes9x_libretro_android.so",
        b"\x7fELF snes9x",
        Some(("snes9x_libretro.info", SNES9X_INFO)),
    );
    let backup_dir = fixture.path("cores64");

    let mut progress = Vec::new();
    let archive = fixture
        .library
        .backup_core(&core, &backup_dir, |p| progress.push(p))
        .unwrap();

    assert_eq!(archive, backup_dir.join("snes9x_libretro_android.zip"));
    assert_eq!(
        zip_contents(&archive),
        vec![
            ("snes9x_libretro.info".to_string(), SNES9X_INFO.as_bytes().to_vec()),
            ("snes9x_libretro_android.so".to_string(), b"\x7fELF snes9x".to_vec()),
        ]
    );
    assert_eq!(progress.last(), Some(&100));
}

#[test]
fn test_backup_core_without_info_replaces_old_backup() {
    let fixture = Fixture::new();
    let core = fixture.add_core("mgba_libretro_android.so", b"new", None);
    let backup_dir = fixture.path("cores64");
    fs::create_dir_all(&backup_dir).unwrap();
    fs::write(backup_dir.join("mgba_libretro_android.zip"), b"stale").unwrap();

    let archive = fixture.library.backup_core(&core, &backup_dir, |_| {}).unwrap();

    assert_eq!(
        zip_contents(&archive),
        vec![("mgba_libretro_android.so".to_string(), b"new".to_vec())]
    );
}

#[test]
fn test_backup_of_missing_core_fails_without_archive() {
    let fixture = Fixture::new();
    let backup_dir = fixture.path("cores64");
    let core = fixture.library.cores_dir().join("gone_libretro_android.so");

    let result = fixture.library.backup_core(&core, &backup_dir, |_| {});

    assert!(matches!(result, Err(LibraryError::NotACore(_))));
    assert!(!backup_dir.join("gone_libretro_android.zip").exists());
}

// ============================================================================
// Local backups
// ============================================================================

#[test]
fn test_local_backups_resolve_info_paths() {
    let fixture = Fixture::new();
    let backup_dir = fixture.path("cores64");
    fs::create_dir_all(&backup_dir).unwrap();

    fs::write(backup_dir.join("snes9x_libretro_android.so"), b"elf").unwrap();
    fs::write(backup_dir.join("snes9x_libretro.info"), SNES9X_INFO).unwrap();
    fs::write(backup_dir.join("mgba_libretro_android.zip"), b"zip").unwrap();
    fs::write(fixture.library.info_dir().join("mgba_libretro.info"), "corename = mGBA\n").unwrap();
    fs::write(backup_dir.join("fceumm_libretro_android.so"), b"elf").unwrap();
    fs::write(backup_dir.join("notes.txt"), b"ignored").unwrap();

    let backups = fixture.library.local_backups(&backup_dir).unwrap();

    assert_eq!(backups.len(), 3);
    assert_eq!(backups[0].path, backup_dir.join("fceumm_libretro_android.so"));
    assert_eq!(backups[0].info_path, None);
    assert_eq!(backups[1].path, backup_dir.join("mgba_libretro_android.zip"));
    assert_eq!(
        backups[1].info_path,
        Some(fixture.library.info_dir().join("mgba_libretro.info"))
    );
    assert_eq!(
        backups[2].info_path,
        Some(backup_dir.join("snes9x_libretro.info")),
        "Backup directory wins over the installed info dir"
    );
}

#[test]
fn test_local_backups_missing_dir_is_empty() {
    let fixture = Fixture::new();
    assert!(fixture
        .library
        .local_backups(&fixture.path("cores64"))
        .unwrap()
        .is_empty());
}

// ============================================================================
// Install
// ============================================================================

#[test]
fn test_backup_then_install_round_trip() {
    let fixture = Fixture::new();
    let core = fixture.add_core(
        "snes9x_libretro_android.so",
        b"\x7fELF snes9x",
        Some(("snes9x_libretro.info", SNES9X_INFO)),
    );
    let backup_dir = fixture.path("cores64");
    let archive = fixture.library.backup_core(&core, &backup_dir, |_| {}).unwrap();

    fs::remove_file(&core).unwrap();
    fs::remove_file(fixture.library.info_dir().join("snes9x_libretro.info")).unwrap();

    let mut progress = Vec::new();
    let installed = fixture
        .library
        .install_backup(&archive, |p| progress.push(p))
        .unwrap();

    assert_eq!(installed, core);
    assert_eq!(fs::read(&core).unwrap(), b"\x7fELF snes9x");
    assert_eq!(
        fs::read_to_string(fixture.library.info_dir().join("snes9x_libretro.info")).unwrap(),
        SNES9X_INFO
    );
    assert_eq!(progress.last(), Some(&100));

    let cores = fixture.library.installed_cores(CoreSort::ByCore).unwrap();
    assert_eq!(cores[0].core_title, "Snes9x");
}

#[test]
fn test_install_plain_library_copies_sibling_info() {
    let fixture = Fixture::new();
    let backup_dir = fixture.path("cores64");
    fs::create_dir_all(&backup_dir).unwrap();
    let backup = backup_dir.join("snes9x_libretro_android.so");
    fs::write(&backup, b"elf").unwrap();
    fs::write(backup_dir.join("snes9x_libretro.info"), SNES9X_INFO).unwrap();

    let installed = fixture.library.install_backup(&backup, |_| {}).unwrap();

    assert_eq!(installed, fixture.library.cores_dir().join("snes9x_libretro_android.so"));
    assert_eq!(fs::read(&installed).unwrap(), b"elf");
    assert!(fixture
        .library
        .info_dir()
        .join("snes9x_libretro.info")
        .is_file());
}

#[test]
fn test_install_core_already_in_place_keeps_bytes() {
    let fixture = Fixture::new();
    let core = fixture.add_core("snes9x_libretro_android.so", b"ELF-core-bytes", None);

    let installed = fixture.library.install_backup(&core, |_| {}).unwrap();

    assert_eq!(installed, core);
    assert_eq!(fs::read(&core).unwrap(), b"ELF-core-bytes");
}

#[test]
fn test_install_from_info_dir_keeps_sibling_info() {
    let fixture = Fixture::new();
    let info_dir = fixture.library.info_dir().to_path_buf();
    let backup = info_dir.join("snes9x_libretro_android.so");
    fs::write(&backup, b"elf").unwrap();
    fs::write(info_dir.join("snes9x_libretro.info"), SNES9X_INFO).unwrap();

    fixture.library.install_backup(&backup, |_| {}).unwrap();

    assert_eq!(
        fs::read_to_string(info_dir.join("snes9x_libretro.info")).unwrap(),
        SNES9X_INFO
    );
}

#[test]
fn test_install_rejects_unknown_files() {
    let fixture = Fixture::new();
    let readme = fixture.path("readme.txt");
    fs::write(&readme, "hello").unwrap();

    assert!(matches!(
        fixture.library.install_backup(&readme, |_| {}),
        Err(LibraryError::NotACore(_))
    ));
}

#[test]
fn test_install_rejects_archive_without_core() {
    let fixture = Fixture::new();
    let archive_path = fixture.path("only_info.zip");
    {
        let mut zip = zip::ZipWriter::new(File::create(&archive_path).unwrap());
        zip.start_file("only_info.info", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, b"corename = x\n").unwrap();
        zip.finish().unwrap();
    }

    assert!(matches!(
        fixture.library.install_backup(&archive_path, |_| {}),
        Err(LibraryError::NotACore(_))
    ));
    assert!(!fixture.library.info_dir().join("only_info.info").exists());
}

#[test]
fn test_install_corrupt_archive_is_zip_error() {
    let fixture = Fixture::new();
    let archive_path = fixture.path("broken_libretro_android.zip");
    fs::write(&archive_path, b"definitely not a zip").unwrap();

    assert!(matches!(
        fixture.library.install_backup(&archive_path, |_| {}),
        Err(LibraryError::Zip(_))
    ));
    assert_eq!(
        fs::read_dir(fixture.library.cores_dir()).unwrap().count(),
        0,
        "Nothing is left behind"
    );
}
