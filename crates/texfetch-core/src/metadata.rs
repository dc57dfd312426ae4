//! Per-asset metadata side-car (`<home>/<asset>/.meta`).
//!
//! JSON object with `name`, `id`, `scraper`, `fetchUrl`, `thumbnail`,
//! `variants` and `custom`. Missing keys default to empty values, unknown
//! keys are ignored, and an unreadable file loads as a blank record: a
//! corrupt side-car means "not cached yet", never a hard failure.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::storage::temp_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Display name.
    pub name: String,
    /// Stable provider-scoped identifier; also the asset directory name.
    pub id: String,
    #[serde(rename = "scraper")]
    pub scraper_name: String,
    /// Canonical source URL, enough to re-derive the variant list.
    #[serde(rename = "fetchUrl")]
    pub fetch_url: String,
    /// File name of the thumbnail inside the asset directory.
    #[serde(rename = "thumbnail")]
    pub thumbnail_filename: Option<String>,
    /// Variant labels in provider priority order.
    pub variants: Vec<String>,
    /// Provider-specific state that must survive a reload (download URLs etc).
    pub custom: Map<String, Value>,
}

impl Metadata {
    pub fn blank() -> Self {
        Self::default()
    }

    /// True once a variant list has been stored. An empty list is never
    /// persisted, so on disk it always means "not resolved yet".
    pub fn is_resolved(&self) -> bool {
        !self.variants.is_empty()
    }

    /// `id`, or `name` when no separate id was assigned.
    pub fn effective_id(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }

    /// Read a side-car. Absent or unparsable files yield a blank record.
    pub fn load(path: &Path) -> Metadata {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("cannot read metadata {}: {}", path.display(), e);
                }
                return Metadata::blank();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("ignoring corrupt metadata {}: {}", path.display(), e);
                Metadata::blank()
            }
        }
    }

    /// Serialize the whole record and replace the file (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| {
            Error::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let tmp = temp_path(path);
        fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
        tracing::debug!("saved metadata {}", path.display());
        Ok(())
    }

    /// Fill this record's blank fields from the side-car at `path`.
    ///
    /// Fields already set in memory win; in particular a provider that has
    /// already identified itself is never replaced by whatever the file says.
    pub fn merge_load(&mut self, path: &Path) {
        let disk = Metadata::load(path);
        if self.scraper_name.is_empty() {
            self.scraper_name = disk.scraper_name;
        }
        if self.name.is_empty() {
            self.name = disk.name;
        }
        if self.id.is_empty() {
            self.id = disk.id;
        }
        if self.fetch_url.is_empty() {
            self.fetch_url = disk.fetch_url;
        }
        if self.thumbnail_filename.is_none() {
            self.thumbnail_filename = disk.thumbnail_filename;
        }
        if self.variants.is_empty() {
            self.variants = disk.variants;
        }
        for (k, v) in disk.custom {
            self.custom.entry(k).or_insert(v);
        }
    }

    pub fn custom_value(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }

    /// Typed read of a custom entry; `None` if absent or of another shape.
    pub fn get_custom<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.custom.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn set_custom(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.custom.insert(key.into(), value.into());
    }
}
