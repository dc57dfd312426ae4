//! ambientCG (`https://ambientcg.com/view?id=<id>`): one zip per variant.

use serde_json::Value;

use super::{suffix_token, translate};
use crate::category::CategorySet;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::registry::ScraperEntry;
use crate::scraper::{json, natural_cmp, Scraper, ScraperEnv, ScraperInfo, ScraperState};
use crate::url_model::{host_is, parse_loose, query_param};

pub static INFO: ScraperInfo = ScraperInfo {
    name: "ambientcg",
    source_name: "ambientCG",
    home_url: Some("https://ambientcg.com"),
    home_dir: "ambientCG",
    categories: CategorySet::MATERIAL,
};

const MAPS_TR: &[(&str, &str)] = &[
    // Old site names.
    ("col", "baseColor"),
    ("nrm", "normalInvertedY"),
    ("mask", "opacity"),
    ("rgh", "roughness"),
    ("met", "metallic"),
    ("AO", "ambientOcclusion"),
    ("disp", "height"),
    ("Color", "baseColor"),
    ("Normal", "normalInvertedY"),
    ("NormalDX", "normalInvertedY"),
    ("NormalGL", "normal"),
    ("Opacity", "opacity"),
    ("Roughness", "roughness"),
    ("Metalness", "metallic"),
    ("AmbientOcclusion", "ambientOcclusion"),
    ("Displacement", "height"),
    ("Emission", "emission"),
];

pub fn entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO,
        can_handle_url,
        build,
    }
}

fn build(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(AmbientCgScraper { env, state })
}

fn can_handle_url(url: &str) -> bool {
    parse_asset_id(url).is_some()
}

fn parse_asset_id(url: &str) -> Option<String> {
    let parsed = parse_loose(url)?;
    if !host_is(&parsed, "ambientcg.com") || !matches!(parsed.path(), "/view" | "/view.php") {
        return None;
    }
    let normalized = parsed.as_str();
    query_param(normalized, "id")
        .or_else(|| query_param(normalized, "tex"))
        .filter(|id| !id.is_empty())
}

fn api_url(id: &str) -> String {
    format!("https://ambientcg.com/api/v1/full_json?id={}", id)
}

/// `2K-JPG` sorts as `JPG 2K`: format first, then resolution.
fn sort_key(variant: &str) -> String {
    variant.rsplit('-').collect::<Vec<_>>().join(" ")
}

pub struct AmbientCgScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for AmbientCgScraper {
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
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "no asset id in URL"))?;
        let api = api_url(&id);
        let data = self.env.fetch_json(&api)?;
        let asset = data
            .get("Assets")
            .and_then(|a| a.get(&id))
            .ok_or_else(|| Error::api_shape(&api, format!("asset {} not in response", id)))?;
        let downloads = json::object_field(asset, "Downloads", &api)?;

        let mut variants: Vec<String> = downloads.keys().cloned().collect();
        variants.sort_by(|a, b| natural_cmp(&sort_key(a), &sort_key(b)));
        let urls = variants
            .iter()
            .map(|v| json::str_field(&downloads[v], "RawDownloadLink", &api).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        let metadata = &mut self.state.metadata;
        metadata.name = id.clone();
        metadata.id = id;
        metadata.set_custom("variants_urls", urls);
        if let Some(thumb) = asset
            .get("PreviewSphere")
            .and_then(|p| p.get("512-PNG"))
            .and_then(Value::as_str)
        {
            metadata.set_custom("thumbnail_url", thumb);
        }
        Ok(variants)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (i, variant) = self.checked_variant(index)?;
        let fetch_url = self.state.metadata.fetch_url.clone();
        let urls: Vec<String> = self
            .state
            .metadata
            .get_custom("variants_urls")
            .ok_or_else(|| Error::api_shape(&fetch_url, "variant URLs missing from metadata"))?;
        let zip_url = urls
            .get(i)
            .ok_or_else(|| Error::api_shape(&fetch_url, format!("no URL for variant {}", variant)))?;

        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;
        let files =
            self.env
                .downloader
                .fetch_and_extract_zip(zip_url, &dir, "textures.zip", self.state.reinstall)?;
        for file in files {
            let Some(map_name) = suffix_token(&file).and_then(|t| translate(MAPS_TR, t)) else {
                continue;
            };
            maps.set_path(map_name, file);
        }
        Ok(())
    }

    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(self.state.metadata.get_custom("thumbnail_url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_view_urls() {
        assert!(can_handle_url("https://ambientcg.com/view?id=Rock030"));
        assert!(can_handle_url("https://www.ambientcg.com/view.php?tex=Rock030"));
        assert!(can_handle_url("ambientcg.com/view?id=Rock030"));
        assert!(!can_handle_url("https://ambientcg.com/list?id=Rock030"));
        assert!(!can_handle_url("https://ambientcg.com/view?id="));
        assert!(!can_handle_url("https://polyhaven.com/a/rocks"));
        assert_eq!(
            parse_asset_id("https://ambientcg.com/view?id=Rock030").as_deref(),
            Some("Rock030")
        );
    }

    #[test]
    fn variants_sort_by_format_then_resolution() {
        let mut v = vec!["8K-PNG", "2K-JPG", "1K-PNG", "16K-JPG", "4K-JPG"];
        v.sort_by(|a, b| natural_cmp(&sort_key(a), &sort_key(b)));
        assert_eq!(v, ["2K-JPG", "4K-JPG", "16K-JPG", "1K-PNG", "8K-PNG"]);
    }

    #[test]
    fn map_names() {
        assert_eq!(translate(MAPS_TR, "NormalGL"), Some("normal"));
        assert_eq!(translate(MAPS_TR, "NormalDX"), Some("normalInvertedY"));
        assert_eq!(translate(MAPS_TR, "Color"), Some("baseColor"));
        assert_eq!(translate(MAPS_TR, "Preview"), None);
    }
}
