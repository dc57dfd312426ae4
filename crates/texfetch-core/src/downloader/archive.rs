//! Zip-packaged variants: download once, extract, leave a marker.
//!
//! After extraction the archive is truncated to zero bytes to save space and
//! an `.extracted` marker is written. The marker is authoritative. A zero-byte
//! archive without a marker (older cache layout) counts only when the
//! directory also holds extracted payload; an empty or failed download never
//! passes for a finished extraction.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::Downloader;
use crate::cache::{has_payload, list_payload, EXTRACTED_MARKER};
use crate::error::{Error, Result};

impl Downloader {
    /// Fetch the zip at `url` into `dest_dir/archive_filename` and extract it
    /// into `dest_dir`. Returns the payload files now present in `dest_dir`.
    pub fn fetch_and_extract_zip(
        &self,
        url: &str,
        dest_dir: &Path,
        archive_filename: &str,
        force_refresh: bool,
    ) -> Result<Vec<PathBuf>> {
        let archive_path = dest_dir.join(archive_filename);
        let marker = dest_dir.join(EXTRACTED_MARKER);

        if !force_refresh && is_extracted(dest_dir, &marker, &archive_path) {
            tracing::debug!("using extracted archive in {}", dest_dir.display());
            return list_payload(dest_dir).map_err(|e| Error::io(dest_dir, e));
        }
        if marker.exists() {
            fs::remove_file(&marker).map_err(|e| Error::io(&marker, e))?;
        }

        self.fetch_to_file(url, &archive_path, force_refresh)?;
        let mut extracted = Vec::new();
        if let Err(e) = extract_zip(&archive_path, dest_dir, &mut extracted) {
            discard_failed_extraction(&archive_path, &extracted);
            return Err(e);
        }
        tracing::info!(
            "extracted {} files from {}",
            extracted.len(),
            archive_path.display()
        );

        File::create(&archive_path).map_err(|e| Error::io(&archive_path, e))?;
        fs::write(&marker, b"").map_err(|e| Error::io(&marker, e))?;
        Ok(extracted)
    }
}

fn is_extracted(dest_dir: &Path, marker: &Path, archive_path: &Path) -> bool {
    if marker.is_file() {
        return true;
    }
    let tombstone = fs::metadata(archive_path)
        .map(|m| m.is_file() && m.len() == 0)
        .unwrap_or(false);
    tombstone && has_payload(dest_dir)
}

/// Remove a bad archive and whatever it left behind, so the next call
/// downloads again instead of re-reading the same broken file.
fn discard_failed_extraction(archive_path: &Path, partial: &[PathBuf]) {
    for path in partial.iter().map(PathBuf::as_path).chain([archive_path]) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("cannot remove {}: {}", path.display(), e);
            }
        }
    }
}

fn archive_error(path: &Path, e: zip::result::ZipError) -> Error {
    Error::Archive {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Extract every file entry of `archive_path` below `dest`, recording each
/// file in `extracted` as it is created. Entries whose names would land
/// outside `dest` are skipped.
fn extract_zip(archive_path: &Path, dest: &Path, extracted: &mut Vec<PathBuf>) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_error(archive_path, e))?;

    extracted.reserve(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_error(archive_path, e))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!("skipping unsafe zip entry {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| Error::io(&outpath, e))?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| Error::io(&outpath, e))?;
        extracted.push(outpath.clone());
        io::copy(&mut entry, &mut outfile).map_err(|e| archive_error(archive_path, e.into()))?;
    }
    extracted.sort();
    Ok(())
}
