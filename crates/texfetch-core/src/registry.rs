//! Provider registry.
//!
//! Entries are kept sorted by provider name, which makes "first capable
//! provider" deterministic regardless of how the list was assembled.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::category::AssetCategory;
use crate::scraper::providers::builtin_entries;
use crate::scraper::{Scraper, ScraperEnv, ScraperInfo, ScraperState};

/// Build a provider instance for one session.
pub type ScraperFactory = fn(ScraperEnv, ScraperState) -> Box<dyn Scraper>;

/// Registration record: static info, URL recognizer, constructor.
#[derive(Clone, Copy)]
pub struct ScraperEntry {
    pub info: &'static ScraperInfo,
    /// Pure URL check; must not touch the network.
    pub can_handle_url: fn(&str) -> bool,
    pub build: ScraperFactory,
}

impl std::fmt::Debug for ScraperEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperEntry")
            .field("name", &self.info.name)
            .field("categories", &self.info.categories)
            .finish()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("provider with an empty name")]
    EmptyName,
    #[error("provider {0} declares no asset category")]
    NoCategory(&'static str),
    #[error("provider {0} registered twice")]
    Duplicate(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct ScraperRegistry {
    entries: Vec<ScraperEntry>,
}

impl ScraperRegistry {
    /// Validate and sort `entries`.
    pub fn new(mut entries: Vec<ScraperEntry>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for e in &entries {
            if e.info.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if e.info.categories.is_empty() {
                return Err(RegistryError::NoCategory(e.info.name));
            }
            if !seen.insert(e.info.name) {
                return Err(RegistryError::Duplicate(e.info.name));
            }
        }
        entries.sort_by_key(|e| e.info.name);
        Ok(Self { entries })
    }

    /// Registry of the built-in providers.
    pub fn builtin() -> Self {
        Self::new(builtin_entries()).unwrap_or_else(|e| {
            tracing::error!("invalid built-in provider table: {}", e);
            Self::default()
        })
    }

    pub fn entries(&self) -> &[ScraperEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.info.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ScraperEntry> {
        self.entries.iter().find(|e| e.info.name == name)
    }

    /// First provider (by name) serving `category` that recognizes `url`.
    pub fn find_capable(&self, url: &str, category: AssetCategory) -> Option<&ScraperEntry> {
        self.entries
            .iter()
            .find(|e| e.info.categories.contains(category) && (e.can_handle_url)(url))
    }

    /// `find_capable`, then instantiate with fresh state.
    pub fn make_scraper(
        &self,
        url: &str,
        category: AssetCategory,
        env: ScraperEnv,
        state: ScraperState,
    ) -> Option<Box<dyn Scraper>> {
        let entry = self.find_capable(url, category)?;
        tracing::debug!("{} handles {} ({})", entry.info.name, url, category);
        Some((entry.build)(env, state))
    }
}

/// Process-wide registry of built-in providers, built on first use.
pub fn global() -> &'static ScraperRegistry {
    static REGISTRY: OnceLock<ScraperRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ScraperRegistry::builtin)
}
