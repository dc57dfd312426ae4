//! Provider protocol.
//!
//! A provider ("scraper") turns a source URL into a list of variant labels,
//! and a selected variant into local files bound to map names. The remote
//! part of each step is provider-specific; caching of the variant list in
//! the asset's `.meta` side-car, index validation and directory layout are
//! shared and live in the trait's provided methods.

pub(crate) mod json;
pub mod providers;
mod sort;

pub use sort::{natural_cmp, sort_naturally_by_key};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::cache::{has_payload, CacheDir};
use crate::category::{AssetCategory, CategorySet};
use crate::downloader::Downloader;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::metadata::Metadata;

/// Static description of a provider.
#[derive(Debug)]
pub struct ScraperInfo {
    /// Registry key; also recorded as `scraper` in `.meta`.
    pub name: &'static str,
    /// Human-readable source name.
    pub source_name: &'static str,
    pub home_url: Option<&'static str>,
    /// Directory under the cache root holding this provider's assets.
    pub home_dir: &'static str,
    pub categories: CategorySet,
}

/// Parsed API documents keyed by URL, shared by every scraper built from
/// the same environment.
#[derive(Debug, Default)]
pub struct ApiCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl ApiCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(url).cloned()
    }

    pub fn insert(&self, url: impl Into<String>, value: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(url.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collaborators a scraper needs: where to download from, where to store.
#[derive(Debug, Clone)]
pub struct ScraperEnv {
    pub downloader: Arc<Downloader>,
    pub cache: CacheDir,
    pub api_cache: Arc<ApiCache>,
}

impl ScraperEnv {
    pub fn new(downloader: Downloader, cache: CacheDir) -> Self {
        Self {
            downloader: Arc::new(downloader),
            cache,
            api_cache: Arc::new(ApiCache::new()),
        }
    }

    /// `Downloader::fetch_json`, memoized per URL for the life of the env.
    pub fn fetch_json(&self, url: &str) -> Result<Value> {
        if let Some(v) = self.api_cache.get(url) {
            tracing::debug!("api cache hit: {}", url);
            return Ok(v);
        }
        let v = self.downloader.fetch_json(url)?;
        self.api_cache.insert(url, v.clone());
        Ok(v)
    }
}

/// Per-session scraper state.
#[derive(Debug, Clone)]
pub struct ScraperState {
    pub metadata: Metadata,
    /// Re-download files even when present in the cache.
    pub reinstall: bool,
    /// For local sources: treat the path as a container of several assets.
    pub deep_check: bool,
    pub category: AssetCategory,
}

impl ScraperState {
    pub fn new(category: AssetCategory) -> Self {
        Self {
            metadata: Metadata::blank(),
            reinstall: false,
            deep_check: false,
            category,
        }
    }
}

pub trait Scraper: Send {
    fn info(&self) -> &'static ScraperInfo;
    fn env(&self) -> &ScraperEnv;
    fn state(&self) -> &ScraperState;
    fn state_mut(&mut self) -> &mut ScraperState;

    /// Asset id encoded in `url`, derived without network access. `None`
    /// when the id can only be learned from the remote API.
    fn asset_id(&self, url: &str) -> Option<String>;

    /// Ask the remote source for the variant list of `url`. Implementations
    /// fill `name`, `id` and whatever `custom` entries `fetch_variant` will
    /// need; the caller records the labels and persists the side-car.
    fn query_variants(&mut self, url: &str) -> Result<Vec<String>>;

    /// Download the variant at `index` (already listed) and bind its files
    /// into `maps`.
    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()>;

    /// Remote thumbnail for the listed asset, if the provider has one.
    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn metadata(&self) -> &Metadata {
        &self.state().metadata
    }

    fn set_reinstall(&mut self, reinstall: bool) {
        self.state_mut().reinstall = reinstall;
    }

    /// Variant labels for `url`. A resolved `.meta` for the asset id encoded
    /// in the URL is used as-is; otherwise the remote is queried once and
    /// the result persisted.
    fn get_variant_list(&mut self, url: &str) -> Result<Vec<String>> {
        let info = self.info();
        if let Some(id) = self.asset_id(url) {
            let meta_path = self.env().cache.meta_path(info.home_dir, &id);
            if let Some(variants) = adopt_cached(self, &meta_path) {
                return Ok(variants);
            }
        }

        let variants = self.query_variants(url)?;
        if variants.is_empty() {
            return Err(Error::NoVariants);
        }
        let fallback_id = self.asset_id(url);
        let env_cache = self.env().cache.clone();
        let metadata = &mut self.state_mut().metadata;
        metadata.scraper_name = info.name.to_string();
        metadata.fetch_url = url.to_string();
        metadata.variants = variants.clone();
        if metadata.id.is_empty() {
            if let Some(id) = fallback_id {
                metadata.id = id;
            }
        }
        if metadata.name.is_empty() {
            metadata.name = metadata.id.clone();
        }
        let meta_path = env_cache.meta_path(info.home_dir, metadata.effective_id());
        metadata.save(&meta_path)?;
        tracing::info!(
            "{}: {} variants for {}",
            info.name,
            variants.len(),
            metadata.effective_id()
        );
        Ok(variants)
    }

    /// Variant labels for an asset already known by name. Falls back to the
    /// stored `fetchUrl` when the side-car has no list yet.
    fn get_variant_data(&mut self, asset_name: &str) -> Result<Vec<String>> {
        let meta_path = self.env().cache.meta_path(self.info().home_dir, asset_name);
        if let Some(variants) = adopt_cached(self, &meta_path) {
            return Ok(variants);
        }
        let fetch_url = Metadata::load(&meta_path).fetch_url;
        if fetch_url.is_empty() {
            return Err(Error::NoSource);
        }
        self.get_variant_list(&fetch_url)
    }

    /// True when the variant's directory already holds payload files.
    fn is_downloaded(&self, variant: &str) -> bool {
        let metadata = self.metadata();
        let dir = self
            .env()
            .cache
            .variant_path(self.info().home_dir, metadata.effective_id(), variant);
        has_payload(&dir)
    }

    /// Bounds-check `index` against the listed variants.
    fn checked_variant(&self, index: isize) -> Result<(usize, String)> {
        let variants = &self.metadata().variants;
        usize::try_from(index)
            .ok()
            .and_then(|i| variants.get(i).map(|v| (i, v.clone())))
            .ok_or(Error::InvalidVariantIndex {
                index,
                len: variants.len(),
            })
    }

    /// Directory for `variant` of the current asset, created if needed.
    fn variant_dir(&self, variant: &str) -> Result<PathBuf> {
        let metadata = self.metadata();
        self.env()
            .cache
            .variant_dir(self.info().home_dir, metadata.effective_id(), variant)
    }

    /// `<home>/<asset>/<variant>`, the display name of resolved maps.
    fn maps_name(&self, variant: &str) -> String {
        format!(
            "{}/{}/{}",
            self.info().home_dir,
            self.metadata().name,
            variant
        )
    }
}

/// Take over a resolved side-car written by this provider (or by none).
/// Fields the session already knows are kept; the rest come from disk.
fn adopt_cached<S: Scraper + ?Sized>(scraper: &mut S, meta_path: &std::path::Path) -> Option<Vec<String>> {
    let cached = Metadata::load(meta_path);
    let name = scraper.info().name;
    if !cached.is_resolved() {
        return None;
    }
    if !cached.scraper_name.is_empty() && cached.scraper_name != name {
        tracing::debug!(
            "{} belongs to {}, not {}",
            meta_path.display(),
            cached.scraper_name,
            name
        );
        return None;
    }
    tracing::debug!("using cached variant list {}", meta_path.display());
    let metadata = &mut scraper.state_mut().metadata;
    metadata.scraper_name = name.to_string();
    metadata.merge_load(meta_path);
    Some(metadata.variants.clone())
}
