//! cgbookcase (`https://www.cgbookcase.com/textures/<id>`).
//!
//! Double-sided materials list every resolution three times: both sides,
//! front only, back only. Back-side maps are bound with a `_back` suffix.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{suffix_token, translate};
use crate::category::CategorySet;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::registry::ScraperEntry;
use crate::scraper::{json, natural_cmp, Scraper, ScraperEnv, ScraperInfo, ScraperState};
use crate::url_model::parse_loose;

pub static INFO: ScraperInfo = ScraperInfo {
    name: "cgbookcase",
    source_name: "cgbookcase.com",
    home_url: Some("https://www.cgbookcase.com/textures/"),
    home_dir: "cgbookcase",
    categories: CategorySet::MATERIAL,
};

const MAPS_TR: &[(&str, &str)] = &[
    ("BaseColor", "baseColor"),
    ("Normal", "normal"),
    ("Opacity", "opacity"),
    ("Roughness", "roughness"),
    ("Metallic", "metallic"),
    ("Height", "height"),
    ("AO", "ambientOcclusion"),
];

const SIDES: [&str; 3] = ["double-sided", "front only", "back only"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sides {
    Both,
    FrontOnly,
    BackOnly,
}

impl Sides {
    fn from_index(i: usize) -> Self {
        match i {
            0 => Sides::Both,
            1 => Sides::FrontOnly,
            _ => Sides::BackOnly,
        }
    }

    fn keeps(self, side: &str) -> bool {
        !matches!(
            (self, side),
            (Sides::BackOnly, "front") | (Sides::FrontOnly, "back")
        )
    }
}

pub fn entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO,
        can_handle_url,
        build,
    }
}

fn build(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(CgbookcaseScraper { env, state })
}

fn can_handle_url(url: &str) -> bool {
    url.contains("cgbookcase.com/textures/") && parse_asset_id(url).is_some()
}

fn parse_asset_id(url: &str) -> Option<String> {
    let parsed = parse_loose(url)?;
    let id = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    if id == "textures" {
        return None;
    }
    Some(id.to_string())
}

fn variant_labels(resolutions: &[String], doublesided: bool) -> Vec<String> {
    if !doublesided {
        return resolutions.to_vec();
    }
    SIDES
        .iter()
        .flat_map(|side| resolutions.iter().map(move |r| format!("{} ({})", r, side)))
        .collect()
}

pub struct CgbookcaseScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for CgbookcaseScraper {
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
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "no texture id in URL"))?;
        let api = format!(
            "https://www.cgbookcase.com/textures/{}/LilySurfaceScraper.json",
            id
        );
        let data = self.env.fetch_json(&api)?;
        let files = json::object_field(&data, "files", &api)?;
        let doublesided = data
            .get("doublesided")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut zip_urls = BTreeMap::new();
        for (res, zip_url) in files {
            let zip_url = zip_url
                .as_str()
                .ok_or_else(|| Error::api_shape(&api, format!("file URL for {} is not a string", res)))?;
            zip_urls.insert(res.clone(), zip_url.to_string());
        }
        let mut resolutions: Vec<String> = zip_urls.keys().cloned().collect();
        resolutions.sort_by(|a, b| natural_cmp(a, b));
        let variants = variant_labels(&resolutions, doublesided);

        let metadata = &mut self.state.metadata;
        metadata.name = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(&id)
            .to_string();
        metadata.id = id;
        metadata.set_custom("resolutions", resolutions);
        metadata.set_custom("doublesided", doublesided);
        let stored: serde_json::Map<String, Value> = zip_urls
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        metadata.set_custom("files", stored);
        Ok(variants)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (i, variant) = self.checked_variant(index)?;
        let metadata = &self.state.metadata;
        let resolutions: Vec<String> = metadata.get_custom("resolutions").unwrap_or_default();
        let files: BTreeMap<String, String> = metadata.get_custom("files").unwrap_or_default();
        let doublesided: bool = metadata.get_custom("doublesided").unwrap_or(false);
        if resolutions.is_empty() {
            return Err(Error::api_shape(&metadata.fetch_url, "resolutions missing from metadata"));
        }

        let res = &resolutions[i % resolutions.len()];
        let sides = Sides::from_index(i / resolutions.len());
        let zip_url = files
            .get(res)
            .ok_or_else(|| Error::api_shape(&metadata.fetch_url, format!("no zip for {}", res)))?;

        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;
        let extracted =
            self.env
                .downloader
                .fetch_and_extract_zip(zip_url, &dir, "textures.zip", self.state.reinstall)?;

        for file in extracted {
            let Some(map_name) = suffix_token(&file).and_then(|t| translate(MAPS_TR, t)) else {
                continue;
            };
            if !doublesided {
                maps.set_path(map_name, file);
                continue;
            }
            let side = file
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.rsplit('_').nth(1))
                .unwrap_or_default()
                .to_string();
            if !sides.keeps(&side) {
                continue;
            }
            if side == "back" {
                maps.set_path(format!("{}_back", map_name), file);
            } else {
                maps.set_path(map_name, file);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_texture_pages() {
        assert!(can_handle_url("https://www.cgbookcase.com/textures/old-planks-01"));
        assert_eq!(
            parse_asset_id("https://www.cgbookcase.com/textures/old-planks-01/").as_deref(),
            Some("old-planks-01")
        );
        assert!(!can_handle_url("https://www.cgbookcase.com/textures/"));
        assert!(!can_handle_url("https://www.cgbookcase.com/downloads/x"));
    }

    #[test]
    fn double_sided_variants_are_tripled() {
        let res = vec!["2K".to_string(), "4K".to_string()];
        assert_eq!(variant_labels(&res, false), ["2K", "4K"]);
        let labels = variant_labels(&res, true);
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[1], "4K (double-sided)");
        assert_eq!(labels[2], "2K (front only)");
        assert_eq!(labels[5], "4K (back only)");
        assert_eq!(Sides::from_index(5 / 2), Sides::BackOnly);
    }

    #[test]
    fn side_filter() {
        assert!(Sides::Both.keeps("front") && Sides::Both.keeps("back"));
        assert!(!Sides::FrontOnly.keeps("back"));
        assert!(!Sides::BackOnly.keeps("front"));
        assert!(Sides::BackOnly.keeps("back"));
    }
}
