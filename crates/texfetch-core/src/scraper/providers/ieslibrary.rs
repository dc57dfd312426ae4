//! IES Library (`https://ieslibrary.com/...#ies-<id>`): one photometric
//! profile per asset.

use std::fs;

use serde_json::Value;

use crate::category::CategorySet;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::registry::ScraperEntry;
use crate::scraper::{json, Scraper, ScraperEnv, ScraperInfo, ScraperState};
use crate::url_model::{host_is, parse_loose, sanitize_path_component};

pub static INFO: ScraperInfo = ScraperInfo {
    name: "ieslibrary",
    source_name: "IES Library",
    home_url: Some("https://ieslibrary.com"),
    home_dir: "ieslibrary",
    categories: CategorySet::LIGHT,
};

/// Plain-text copy of the light energy, next to the profile.
pub const ENERGY_FILENAME: &str = "lightEnergy";

pub fn entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO,
        can_handle_url,
        build,
    }
}

fn build(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(IesLibraryScraper { env, state })
}

fn can_handle_url(url: &str) -> bool {
    parse_asset_id(url).is_some()
}

fn parse_asset_id(url: &str) -> Option<String> {
    let parsed = parse_loose(url)?;
    if !host_is(&parsed, "ieslibrary.com") {
        return None;
    }
    let id = parsed.fragment()?.strip_prefix("ies-")?;
    (!id.is_empty()).then(|| id.to_string())
}

pub struct IesLibraryScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for IesLibraryScraper {
    fn info(&self) -> &'static ScraperInfo {
        &INFO
    }

    fn env(&self) -> &ScraperEnv {
        &self.env
    }

    fn state(&self) -> &ScraperState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ScraperState {
        &mut self.state
    }

    fn asset_id(&self, url: &str) -> Option<String> {
        parse_asset_id(url)
    }

    fn query_variants(&mut self, url: &str) -> Result<Vec<String>> {
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "no IES id in URL"))?;
        let api = format!("https://ieslibrary.com/en/browse/data.json?ies={}", id);
        let data = self.env.fetch_json(&api)?;

        let lumcat = data.get("lumcat").and_then(Value::as_str).unwrap_or_default();
        let variant = if lumcat.is_empty() { id.clone() } else { lumcat.to_string() };
        let download_url = json::str_field(&data, "downloadUrlIes", &api)?.to_string();
        let energy = json::number_field(&data, "energy", &api)?;

        let metadata = &mut self.state.metadata;
        metadata.name = id.clone();
        metadata.id = id;
        metadata.set_custom("download_url", download_url);
        metadata.set_custom("energy", energy);
        if let Some(preview) = data.get("preview").and_then(Value::as_str) {
            metadata.set_custom("thumbnail_url", preview);
        }
        Ok(vec![variant])
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (_, variant) = self.checked_variant(index)?;
        let metadata = &self.state.metadata;
        let download_url: String = metadata
            .get_custom("download_url")
            .ok_or_else(|| Error::api_shape(&metadata.fetch_url, "download URL missing from metadata"))?;
        let energy: f64 = metadata.get_custom("energy").unwrap_or(1.0);

        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;
        let dest = dir.join(format!("{}.ies", sanitize_path_component(&variant)));
        let path = self
            .env
            .downloader
            .fetch_to_file(&download_url, &dest, self.state.reinstall)?;

        let energy_path = dir.join(ENERGY_FILENAME);
        fs::write(&energy_path, energy.to_string()).map_err(|e| Error::io(&energy_path, e))?;

        maps.set_path("ies", path);
        maps.set_scalar("energy", energy);
        Ok(())
    }

    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(self.state.metadata.get_custom("thumbnail_url"))
    }
}
