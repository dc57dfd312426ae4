//! One resolution session: source URL (or cached asset name) to maps.
//!
//! A session lists variants at most once, resolves at most one variant and
//! records the first error it hits; every later call returns that error.

use std::path::PathBuf;

use crate::category::AssetCategory;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::metadata::Metadata;
use crate::registry::ScraperRegistry;
use crate::scraper::{Scraper, ScraperEnv, ScraperState};
use crate::url_model::extension_from_url;

/// Asset name that asks the local provider to scan a directory for several
/// assets instead of treating it as one.
pub const LOCAL_SUBDIR_ASSET: &str = "LOCAL_FILE_SCRAPER-SUBDIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unresolved,
    Listed,
    Resolved,
    Failed,
}

pub struct ScrapedData {
    url: String,
    asset_name: Option<String>,
    category: AssetCategory,
    scraper: Option<Box<dyn Scraper>>,
    variants: Option<Vec<String>>,
    maps: Option<Maps>,
    error: Option<Error>,
    state: SessionState,
}

impl std::fmt::Debug for ScrapedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapedData")
            .field("url", &self.url)
            .field("asset_name", &self.asset_name)
            .field("category", &self.category)
            .field("scraper", &self.scraper_name())
            .field("state", &self.state)
            .field("error", &self.error)
            .finish()
    }
}

impl ScrapedData {
    /// Pick a provider for `url`. Failure to find one is recorded, not returned.
    pub fn new(
        registry: &ScraperRegistry,
        env: ScraperEnv,
        url: &str,
        category: AssetCategory,
    ) -> Self {
        Self::build(registry, env, url, None, category)
    }

    /// Like `new`, but list variants from the cached asset `asset_name`
    /// instead of querying `url` (which still selects the provider).
    pub fn from_asset_name(
        registry: &ScraperRegistry,
        env: ScraperEnv,
        url: &str,
        asset_name: &str,
        category: AssetCategory,
    ) -> Self {
        Self::build(registry, env, url, Some(asset_name), category)
    }

    fn build(
        registry: &ScraperRegistry,
        env: ScraperEnv,
        url: &str,
        asset_name: Option<&str>,
        category: AssetCategory,
    ) -> Self {
        let url = url.trim().trim_matches('"').to_string();
        let mut state = ScraperState::new(category);
        let asset_name = match asset_name {
            Some(LOCAL_SUBDIR_ASSET) => {
                state.deep_check = true;
                None
            }
            Some("") | None => None,
            Some(name) => Some(name.to_string()),
        };

        let mut session = Self {
            url,
            asset_name,
            category,
            scraper: None,
            variants: None,
            maps: None,
            error: None,
            state: SessionState::Unresolved,
        };
        if session.url.is_empty() {
            session.fail(Error::NoSource);
            return session;
        }
        match registry.make_scraper(&session.url, category, env, state) {
            Some(scraper) => session.scraper = Some(scraper),
            None => {
                tracing::info!("no provider for {} ({})", session.url, category);
                session.fail(Error::UnsupportedSource);
            }
        }
        session
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// First error recorded, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn scraper_name(&self) -> Option<&'static str> {
        self.scraper.as_ref().map(|s| s.info().name)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.scraper.as_ref().map(|s| s.metadata())
    }

    /// Maps of the resolved variant.
    pub fn maps(&self) -> Option<&Maps> {
        self.maps.as_ref()
    }

    pub fn into_maps(self) -> Option<Maps> {
        self.maps
    }

    fn fail(&mut self, e: Error) -> Error {
        if self.error.is_none() {
            tracing::warn!("session {} failed: {}", self.url, e);
            self.error = Some(e.clone());
        }
        self.state = SessionState::Failed;
        e
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Variant labels; queried once per session, then memoized.
    pub fn list_variants(&mut self) -> Result<&[String]> {
        self.check()?;
        if self.variants.is_some() {
            return Ok(self.variants.as_deref().unwrap_or_default());
        }
        let Some(scraper) = self.scraper.as_mut() else {
            return Err(self.fail(Error::UnsupportedSource));
        };
        let listed = match &self.asset_name {
            Some(name) => scraper.get_variant_data(name),
            None => scraper.get_variant_list(&self.url),
        };
        match listed {
            Ok(v) if v.is_empty() => Err(self.fail(Error::NoVariants)),
            Ok(v) => {
                if self.state == SessionState::Unresolved {
                    self.state = SessionState::Listed;
                }
                Ok(self.variants.insert(v).as_slice())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Download the variant at `index` and return its maps. Lists variants
    /// first when that has not happened yet. At most once per session.
    pub fn select_variant(&mut self, index: isize) -> Result<&Maps> {
        self.check()?;
        if self.state == SessionState::Resolved {
            return Err(Error::SessionFinished);
        }
        if self.variants.is_none() {
            self.list_variants()?;
        }
        let Some(scraper) = self.scraper.as_mut() else {
            return Err(self.fail(Error::UnsupportedSource));
        };
        let mut maps = Maps::new(self.category);
        match scraper.fetch_variant(index, &mut maps) {
            Ok(()) => {
                tracing::info!("resolved {} with {} maps", maps.name(), maps.len());
                self.state = SessionState::Resolved;
                Ok(self.maps.insert(maps))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Ignore the local cache when fetching. Only meaningful before
    /// `select_variant`.
    pub fn set_reinstall(&mut self, reinstall: bool) {
        if self.state == SessionState::Resolved {
            tracing::warn!("set_reinstall after a variant was resolved has no effect");
        }
        if let Some(scraper) = self.scraper.as_mut() {
            scraper.set_reinstall(reinstall);
        }
    }

    /// Local liveness check for a listed variant; never touches the network.
    pub fn is_downloaded(&self, variant: &str) -> bool {
        self.scraper
            .as_ref()
            .map(|s| s.is_downloaded(variant))
            .unwrap_or(false)
    }

    /// Thumbnail image of the listed asset, downloaded next to `.meta`.
    /// Best effort: any failure is logged and yields `None`.
    pub fn thumbnail(&mut self) -> Option<PathBuf> {
        if self.error.is_some() {
            return None;
        }
        let scraper = self.scraper.as_mut()?;
        match fetch_thumbnail(scraper.as_mut()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("thumbnail unavailable for {}: {}", self.url, e);
                None
            }
        }
    }
}

fn fetch_thumbnail(scraper: &mut dyn Scraper) -> Result<Option<PathBuf>> {
    if !scraper.metadata().is_resolved() {
        return Ok(None);
    }
    let home_dir = scraper.info().home_dir;
    let id = scraper.metadata().effective_id().to_string();
    let cache = scraper.env().cache.clone();

    if let Some(existing) = &scraper.metadata().thumbnail_filename {
        let path = cache.asset_path(home_dir, &id).join(existing);
        if path.is_file() {
            return Ok(Some(path));
        }
    }
    let Some(url) = scraper.thumbnail_url()? else {
        return Ok(None);
    };
    let ext = match extension_from_url(&url) {
        e if e.is_empty() => ".png".to_string(),
        e => e,
    };
    let filename = format!("thumbnail{}", ext);
    let dest = cache.asset_dir(home_dir, &id)?.join(&filename);
    let path = scraper.env().downloader.fetch_to_file(&url, &dest, false)?;

    let metadata = &mut scraper.state_mut().metadata;
    metadata.thumbnail_filename = Some(filename);
    // Providers without a cached side-car (local files) have nothing to update.
    let meta_path = cache.meta_path(home_dir, &id);
    if meta_path.is_file() {
        metadata.save(&meta_path)?;
    }
    Ok(Some(path))
}
