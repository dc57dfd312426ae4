//! Resolved map bundle returned to the host for one variant.
//!
//! Keys are the host-side map names (`baseColor`, `normal`, `sky`, `ies`...).
//! Values are absolute file paths, or a scalar for the light `energy`.
//! Providers may add keys beyond the well-known ones (e.g. `baseColor_back`
//! for the back side of a double-sided material).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::category::AssetCategory;

/// Material channel names understood by hosts.
pub const MATERIAL_KEYS: &[&str] = &[
    "baseColor",
    "diffuse",
    "normal",
    "normalInvertedY",
    "opacity",
    "roughness",
    "glossiness",
    "metallic",
    "specular",
    "height",
    "vectorDisplacement",
    "emission",
    "ambientOcclusion",
    "ambientOcclusionRough",
];

pub const WORLD_KEYS: &[&str] = &["sky"];

pub const LIGHT_KEYS: &[&str] = &["ies", "energy"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MapValue {
    Path(PathBuf),
    Scalar(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Maps {
    category: AssetCategory,
    name: String,
    values: BTreeMap<String, MapValue>,
}

impl Maps {
    pub fn new(category: AssetCategory) -> Self {
        Self {
            category,
            name: String::new(),
            values: BTreeMap::new(),
        }
    }

    /// Well-known keys for `category`.
    pub fn known_keys(category: AssetCategory) -> &'static [&'static str] {
        match category {
            AssetCategory::Material => MATERIAL_KEYS,
            AssetCategory::World => WORLD_KEYS,
            AssetCategory::Light => LIGHT_KEYS,
        }
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    /// Display name, `<home>/<asset>/<variant>` for remote providers.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_path(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let key = key.into();
        let path = path.into();
        if !Self::known_keys(self.category).contains(&key.as_str()) {
            tracing::debug!("extra {} map {}: {}", self.category, key, path.display());
        }
        self.values.insert(key, MapValue::Path(path));
    }

    pub fn set_scalar(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), MapValue::Scalar(value));
    }

    pub fn get(&self, key: &str) -> Option<&MapValue> {
        self.values.get(key)
    }

    pub fn path(&self, key: &str) -> Option<&Path> {
        match self.values.get(key)? {
            MapValue::Path(p) => Some(p),
            MapValue::Scalar(_) => None,
        }
    }

    pub fn scalar(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            MapValue::Scalar(v) => Some(*v),
            MapValue::Path(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
