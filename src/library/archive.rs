//! src/library/archive.rs
//!
//! Byte-level file work for core backups: progress-reporting copies and the
//! zip archives a backup is stored in.
//!
//! Every file this module creates is removed again if writing it fails, so a
//! failed backup or install never leaves a truncated core behind.

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use super::LibraryError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Files written by [`extract_backup`]
#[derive(Debug, Default)]
pub(crate) struct ExtractedBackup {
    pub cores: Vec<PathBuf>,
    pub infos: Vec<PathBuf>,
}

/// `done` of `total` as a whole percentage, 100 for an empty total
pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

/// Copies `reader` into `writer`, reporting progress against `total` bytes.
pub(crate) fn copy_with_progress(
    reader: &mut impl Read,
    writer: &mut impl Write,
    total: u64,
    progress: &mut impl FnMut(u8),
) -> io::Result<u64> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
        progress(percent(copied, total));
    }

    if total == 0 {
        progress(100);
    }

    Ok(copied)
}

/// Creates `target` and fills it; on any failure the partial file is deleted.
pub(crate) fn write_file(
    target: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<()> {
    let mut out = File::create(target)?;

    if let Err(e) = fill(&mut out).and_then(|()| out.sync_all()) {
        drop(out);
        if let Err(cleanup) = fs::remove_file(target) {
            warn!(path = %target.display(), error = %cleanup, "could not remove partial file");
        }
        return Err(e);
    }

    Ok(())
}

/// Whether both paths name the same existing file
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copies `source` to `target`, reporting progress.
///
/// Copying a file onto itself is a no-op; creating the target would
/// truncate the source before it is read.
pub(crate) fn copy_file(
    source: &Path,
    target: &Path,
    progress: &mut impl FnMut(u8),
) -> io::Result<()> {
    if same_file(source, target) {
        debug!(path = %source.display(), "source is already in place");
        progress(100);
        return Ok(());
    }

    let total = fs::metadata(source)?.len();
    let mut reader = File::open(source)?;

    write_file(target, |out| {
        copy_with_progress(&mut reader, out, total, progress).map(|_| ())
    })
}

/// Zips `core` (and `info` when given) into `target`.
///
/// Progress follows the core file only; the info file is a few hundred bytes.
pub(crate) fn write_backup_archive(
    core: &Path,
    info: Option<&Path>,
    target: &Path,
    progress: &mut impl FnMut(u8),
) -> Result<(), LibraryError> {
    let result = zip_into(core, info, target, progress);

    if result.is_err() && target.exists() {
        if let Err(e) = fs::remove_file(target) {
            warn!(path = %target.display(), error = %e, "could not remove partial backup");
        }
    }

    result
}

fn zip_into(
    core: &Path,
    info: Option<&Path>,
    target: &Path,
    progress: &mut impl FnMut(u8),
) -> Result<(), LibraryError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(File::create(target)?);

    let total = fs::metadata(core)?.len();
    zip.start_file(entry_name(core)?, options)?;
    copy_with_progress(&mut File::open(core)?, &mut zip, total, progress)?;

    if let Some(info) = info {
        zip.start_file(entry_name(info)?, options)?;
        io::copy(&mut File::open(info)?, &mut zip)?;
    }

    zip.finish()?.sync_all()?;
    debug!(archive = %target.display(), "wrote core backup");

    Ok(())
}

/// Unpacks a backup archive.
///
/// Entries are flattened to their file names: `.info` files go to
/// `info_dir`, everything else to `cores_dir`. Entries whose names escape
/// the archive root are skipped. If any entry fails, the files already
/// extracted are removed again.
pub(crate) fn extract_backup(
    archive_path: &Path,
    cores_dir: &Path,
    info_dir: &Path,
    progress: &mut impl FnMut(u8),
) -> Result<ExtractedBackup, LibraryError> {
    let mut extracted = ExtractedBackup::default();

    match extract_entries(archive_path, cores_dir, info_dir, progress, &mut extracted) {
        Ok(()) => Ok(extracted),
        Err(e) => {
            for path in extracted.cores.iter().chain(&extracted.infos) {
                if let Err(cleanup) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %cleanup, "could not remove extracted file");
                }
            }
            Err(e)
        }
    }
}

fn extract_entries(
    archive_path: &Path,
    cores_dir: &Path,
    info_dir: &Path,
    progress: &mut impl FnMut(u8),
    extracted: &mut ExtractedBackup,
) -> Result<(), LibraryError> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let count = archive.len();

    for i in 0..count {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(name) = entry
            .enclosed_name()
            .and_then(|path| path.file_name().map(PathBuf::from))
        else {
            warn!(archive = %archive_path.display(), entry = entry.name(), "skipping unsafe zip entry");
            continue;
        };

        let is_info = name.extension().is_some_and(|ext| ext == "info");
        let target = if is_info {
            info_dir.join(&name)
        } else {
            cores_dir.join(&name)
        };

        write_file(&target, |out| io::copy(&mut entry, out).map(|_| ()))?;
        debug!(entry = %name.display(), target = %target.display(), "extracted");

        if is_info {
            extracted.infos.push(target);
        } else {
            extracted.cores.push(target);
        }
        progress(percent(i as u64 + 1, count as u64));
    }

    if count == 0 {
        progress(100);
    }

    Ok(())
}

/// Names of the non-directory entries in an archive
pub(crate) fn archive_file_names(archive_path: &Path) -> Result<Vec<String>, LibraryError> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut names = Vec::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }

    Ok(names)
}

fn entry_name(path: &Path) -> Result<String, LibraryError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LibraryError::NotACore(path.to_path_buf()))
}
