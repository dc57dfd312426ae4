//! On-disk cache layout.
//!
//! ```text
//! <root>/<providerHomeDir>/<assetId>/.meta
//! <root>/<providerHomeDir>/<assetId>/<variantLabel>/<payload files>
//! ```
//!
//! The same inputs always resolve to the same directory, which is what lets
//! a second run find what the first one fetched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::TEMP_SUFFIX;
use crate::url_model::sanitize_path_component;

/// Name of the per-asset metadata side-car.
pub const META_FILENAME: &str = ".meta";

/// Written next to extracted archive contents once extraction completed.
pub const EXTRACTED_MARKER: &str = ".extracted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `relative` onto the root and create the tree (`mkdir -p`).
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = self.root.join(relative);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(dir)
    }

    /// `<home>/<asset>` with each component sanitized. Not created.
    pub fn asset_relative(home_dir: &str, asset_id: &str) -> PathBuf {
        PathBuf::from(sanitize_path_component(home_dir)).join(sanitize_path_component(asset_id))
    }

    /// `<home>/<asset>/<variant>` with each component sanitized. Not created.
    pub fn variant_relative(home_dir: &str, asset_id: &str, variant: &str) -> PathBuf {
        Self::asset_relative(home_dir, asset_id).join(sanitize_path_component(variant))
    }

    /// Asset directory path without touching the filesystem.
    pub fn asset_path(&self, home_dir: &str, asset_id: &str) -> PathBuf {
        self.root.join(Self::asset_relative(home_dir, asset_id))
    }

    /// Variant directory path without touching the filesystem.
    pub fn variant_path(&self, home_dir: &str, asset_id: &str, variant: &str) -> PathBuf {
        self.root.join(Self::variant_relative(home_dir, asset_id, variant))
    }

    pub fn asset_dir(&self, home_dir: &str, asset_id: &str) -> Result<PathBuf> {
        self.resolve(Self::asset_relative(home_dir, asset_id))
    }

    pub fn variant_dir(&self, home_dir: &str, asset_id: &str, variant: &str) -> Result<PathBuf> {
        self.resolve(Self::variant_relative(home_dir, asset_id, variant))
    }

    pub fn meta_path(&self, home_dir: &str, asset_id: &str) -> PathBuf {
        self.asset_path(home_dir, asset_id).join(META_FILENAME)
    }
}

fn is_bookkeeping(name: &str) -> bool {
    name == META_FILENAME || name == EXTRACTED_MARKER || name.ends_with(TEMP_SUFFIX)
}

/// Payload files under `dir`, recursively, sorted. Bookkeeping files,
/// `.part` leftovers and zero-byte files (spent archives) are skipped.
pub fn list_payload(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    collect_payload(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_payload(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_payload(&path, out)?;
            continue;
        }
        let name = entry.file_name();
        if is_bookkeeping(&name.to_string_lossy()) {
            continue;
        }
        if entry.metadata()?.len() > 0 {
            out.push(path);
        }
    }
    Ok(())
}

/// Liveness check for a variant directory: it exists and holds at least one
/// non-empty payload file. Never touches the network.
pub fn has_payload(dir: &Path) -> bool {
    dir.is_dir() && list_payload(dir).map(|files| !files.is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_idempotent_and_stable() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = CacheDir::new(tmp.path());
        let a = cache.variant_dir("ambientCG", "Rock030", "2K-JPG").unwrap();
        let b = cache.variant_dir("ambientCG", "Rock030", "2K-JPG").unwrap();
        assert_eq!(a, b);
        assert!(a.is_dir());
        assert_eq!(a, tmp.path().join("ambientCG/Rock030/2K-JPG"));
    }

    #[test]
    fn components_cannot_escape_root() {
        let cache = CacheDir::new("/cache");
        assert_eq!(
            cache.variant_path("home", "../etc", "a/b"),
            PathBuf::from("/cache/home/_etc/a_b")
        );
        assert_eq!(
            cache.meta_path("polyhaven", "rocks"),
            PathBuf::from("/cache/polyhaven/rocks/.meta")
        );
    }

    #[test]
    fn payload_ignores_bookkeeping_and_tombstones() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        assert!(!has_payload(dir));
        fs::write(dir.join(META_FILENAME), b"{}").unwrap();
        fs::write(dir.join(EXTRACTED_MARKER), b"").unwrap();
        fs::write(dir.join("textures.zip"), b"").unwrap();
        fs::write(dir.join("sky.exr.part"), b"partial").unwrap();
        assert!(!has_payload(dir));

        fs::create_dir(dir.join("maps")).unwrap();
        fs::write(dir.join("maps/Rock_Color.jpg"), b"jpg").unwrap();
        assert!(has_payload(dir));
        assert_eq!(list_payload(dir).unwrap(), vec![dir.join("maps/Rock_Color.jpg")]);
    }

    #[test]
    fn missing_dir_has_no_payload() {
        assert!(!has_payload(Path::new("/definitely/not/here")));
    }
}
