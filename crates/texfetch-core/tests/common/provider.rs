//! "Provider X": a minimal zip-per-variant provider served by `StubTransport`.
//!
//! `https://x.example/asset/<id>` lists the variants found in
//! `https://x.example/api/<id>.json`:
//! `{"name": .., "variants": [{"label": .., "zip": ..}], "thumbnail": ..}`.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Value};
use texfetch_core::{
    CategorySet, Error, Maps, Result, Scraper, ScraperEntry, ScraperEnv, ScraperInfo,
    ScraperState,
};

use super::stub::StubTransport;
use super::zip_bytes;

pub static INFO: ScraperInfo = ScraperInfo {
    name: "provider-x",
    source_name: "Provider X",
    home_url: Some("https://x.example"),
    home_dir: "providerx",
    categories: CategorySet::MATERIAL,
};

/// Same provider registered under a name that sorts first.
pub static INFO_EARLY: ScraperInfo = ScraperInfo {
    name: "aaa-provider",
    source_name: "Provider X (early)",
    home_url: None,
    home_dir: "providerx",
    categories: CategorySet::MATERIAL,
};

static QUERIES: Mutex<Option<HashMap<String, usize>>> = Mutex::new(None);

/// Number of remote variant-list queries made for `asset_id`.
pub fn query_count(asset_id: &str) -> usize {
    QUERIES
        .lock()
        .unwrap()
        .as_ref()
        .and_then(|m| m.get(asset_id).copied())
        .unwrap_or(0)
}

fn record_query(asset_id: &str) {
    let mut guard = QUERIES.lock().unwrap();
    *guard
        .get_or_insert_with(HashMap::new)
        .entry(asset_id.to_string())
        .or_insert(0) += 1;
}

pub fn entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO,
        can_handle_url,
        build,
    }
}

pub fn early_entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO_EARLY,
        can_handle_url,
        build,
    }
}

pub fn asset_url(id: &str) -> String {
    format!("https://x.example/asset/{}", id)
}

pub fn api_url(id: &str) -> String {
    format!("https://x.example/api/{}.json", id)
}

pub fn zip_url(id: &str, label: &str) -> String {
    format!("https://x.example/files/{}_{}.zip", id, label)
}

/// Serve asset `id` with one zip per label, each holding a color and a
/// normal map plus a preview image that maps to nothing.
pub fn serve_asset(transport: &StubTransport, id: &str, labels: &[&str]) {
    let variants: Vec<Value> = labels
        .iter()
        .map(|l| json!({"label": l, "zip": zip_url(id, l)}))
        .collect();
    transport.route_json(
        &api_url(id),
        &json!({"name": format!("Asset {}", id), "variants": variants}),
    );
    for label in labels {
        let color = format!("{}_{}_Color.jpg", id, label);
        let normal = format!("{}_{}_Normal.jpg", id, label);
        let archive = zip_bytes(&[
            (color.as_str(), b"color".as_slice()),
            (normal.as_str(), b"normal".as_slice()),
            ("preview.png", b"png".as_slice()),
        ]);
        transport.route(&zip_url(id, label), archive);
    }
}

fn can_handle_url(url: &str) -> bool {
    parse_asset_id(url).is_some()
}

fn parse_asset_id(url: &str) -> Option<String> {
    url.strip_prefix("https://x.example/asset/")
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn build(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(ProviderX { env, state })
}

pub struct ProviderX {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for ProviderX {
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
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "bad url"))?;
        record_query(&id);
        let data = self.env.fetch_json(&api_url(&id))?;
        let entries = data["variants"]
            .as_array()
            .ok_or_else(|| Error::api_shape(api_url(&id), "no variants"))?;
        let labels: Vec<String> = entries
            .iter()
            .filter_map(|v| v["label"].as_str().map(str::to_string))
            .collect();
        let zips: Vec<String> = entries
            .iter()
            .filter_map(|v| v["zip"].as_str().map(str::to_string))
            .collect();

        let metadata = &mut self.state.metadata;
        metadata.name = data["name"].as_str().unwrap_or(&id).to_string();
        metadata.id = id;
        metadata.set_custom("zips", zips);
        if let Some(thumb) = data["thumbnail"].as_str() {
            metadata.set_custom("thumbnail_url", thumb);
        }
        Ok(labels)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (i, variant) = self.checked_variant(index)?;
        let zips: Vec<String> = self.state.metadata.get_custom("zips").unwrap_or_default();
        let url = zips
            .get(i)
            .ok_or_else(|| Error::api_shape("metadata", "zip missing"))?;
        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;
        let files = self
            .env
            .downloader
            .fetch_and_extract_zip(url, &dir, "textures.zip", self.state.reinstall)?;
        for file in files {
            let stem = file.file_stem().unwrap().to_string_lossy().into_owned();
            if stem.ends_with("_Color") {
                maps.set_path("baseColor", file);
            } else if stem.ends_with("_Normal") {
                maps.set_path("normal", file);
            }
        }
        Ok(())
    }

    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(self.state.metadata.get_custom("thumbnail_url"))
    }
}
