//! Poly Haven (`https://polyhaven.com/a/<id>`).
//!
//! Textures and HDRIs share one URL scheme; the info endpoint's `type`
//! (0 = HDRI, 1 = texture) tells them apart, so both providers accept the
//! URL and the requested category picks one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::translate;
use crate::category::CategorySet;
use crate::downloader::FetchRequest;
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::registry::ScraperEntry;
use crate::scraper::{json, natural_cmp, Scraper, ScraperEnv, ScraperInfo, ScraperState};
use crate::url_model::{extension_from_url, host_is, parse_loose};

const API_BASE: &str = "https://api.polyhaven.com";

const TYPE_HDRI: i64 = 0;
const TYPE_TEXTURE: i64 = 1;

pub static TEXTURE_INFO: ScraperInfo = ScraperInfo {
    name: "polyhaven-texture",
    source_name: "Poly Haven Texture",
    home_url: Some("https://polyhaven.com/textures"),
    home_dir: "texturehaven",
    categories: CategorySet::MATERIAL,
};

pub static HDRI_INFO: ScraperInfo = ScraperInfo {
    name: "polyhaven-hdri",
    source_name: "Poly Haven HDRI",
    home_url: Some("https://polyhaven.com/hdris"),
    home_dir: "hdrihaven",
    categories: CategorySet::WORLD,
};

/// Poly Haven map types (lowercased) to host map names.
const MAPS_TR: &[(&str, &str)] = &[
    ("diffuse", "diffuse"),
    ("diff_png", "diffuse"),
    ("normal", "normal"),
    ("nor_gl", "normal"),
    ("normal_gl", "normal"),
    ("nor_dx", "normalInvertedY"),
    ("rough", "roughness"),
    ("ao", "ambientOcclusion"),
    ("displacement", "height"),
    ("bump", "height"),
    ("spec", "specular"),
    ("specular", "specular"),
    ("ref", "specular"),
    ("metal", "metallic"),
    ("metallic", "metallic"),
    ("rough_ao", "ambientOcclusionRough"),
    ("rough_diff", "roughness"),
    ("translucent", "opacity"),
    ("albedo", "baseColor"),
    ("col1", "baseColor"),
    ("col_01", "baseColor"),
    ("col_1", "baseColor"),
    ("coll1", "baseColor"),
    ("col2", "baseColor_02"),
    ("col_02", "baseColor_02"),
    ("col_2", "baseColor_02"),
    ("coll2", "baseColor_02"),
    ("col_03", "baseColor_03"),
];

pub fn texture_entry() -> ScraperEntry {
    ScraperEntry {
        info: &TEXTURE_INFO,
        can_handle_url,
        build: build_texture,
    }
}

pub fn hdri_entry() -> ScraperEntry {
    ScraperEntry {
        info: &HDRI_INFO,
        can_handle_url,
        build: build_hdri,
    }
}

fn build_texture(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(PolyHavenTextureScraper { env, state })
}

fn build_hdri(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(PolyHavenHdriScraper { env, state })
}

fn can_handle_url(url: &str) -> bool {
    parse_asset_id(url).is_some()
}

fn parse_asset_id(url: &str) -> Option<String> {
    let parsed = parse_loose(url)?;
    if !host_is(&parsed, "polyhaven.com") {
        return None;
    }
    let mut segments = parsed.path_segments()?;
    match (segments.next(), segments.next()) {
        (Some("a"), Some(id)) if !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}

fn thumbnail_for(id: &str) -> String {
    format!(
        "https://cdn.polyhaven.com/asset_img/thumbs/{}.png?width=512&height=512",
        id
    )
}

/// Fetch `/info/<id>`, check the asset type and return its display name.
fn query_info(env: &ScraperEnv, id: &str, expected_type: i64, what: &str) -> Result<String> {
    let url = format!("{}/info/{}", API_BASE, id);
    let info = env.fetch_json(&url)?;
    let asset_type = json::field(&info, "type", &url)?.as_i64();
    if asset_type != Some(expected_type) {
        return Err(Error::api_shape(&url, format!("not {}", what)));
    }
    Ok(info
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string())
}

/// One `<res> (<fmt>)` variant of a texture: map type to download URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TextureVariant {
    resolution: String,
    format: String,
    maps: BTreeMap<String, String>,
}

impl TextureVariant {
    fn label(&self) -> String {
        format!("{} ({})", self.resolution, self.format)
    }
}

fn texture_variants(files: &Value, url: &str) -> Result<Vec<TextureVariant>> {
    let files = files
        .as_object()
        .ok_or_else(|| Error::api_shape(url, "files listing is not an object"))?;
    let mut by_variant: BTreeMap<(String, String), BTreeMap<String, String>> = BTreeMap::new();
    for (map_type, resolutions) in files {
        if translate(MAPS_TR, &map_type.to_lowercase()).is_none() {
            continue;
        }
        let Some(resolutions) = resolutions.as_object() else {
            continue;
        };
        for (res, formats) in resolutions {
            let Some(formats) = formats.as_object() else {
                continue;
            };
            for (fmt, data) in formats {
                let file_url = json::str_field(data, "url", url)?;
                by_variant
                    .entry((res.clone(), fmt.clone()))
                    .or_default()
                    .insert(map_type.clone(), file_url.to_string());
            }
        }
    }

    let mut variants: Vec<TextureVariant> = by_variant
        .into_iter()
        .map(|((resolution, format), maps)| TextureVariant {
            resolution,
            format,
            maps,
        })
        .collect();
    variants.sort_by(|a, b| {
        natural_cmp(
            &format!("{} {}", a.format, a.resolution),
            &format!("{} {}", b.format, b.resolution),
        )
    });
    Ok(variants)
}

pub struct PolyHavenTextureScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for PolyHavenTextureScraper {
    fn info(&self) -> &'static ScraperInfo {
        &TEXTURE_INFO
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
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "Bad Url"))?;
        let name = query_info(&self.env, &id, TYPE_TEXTURE, "a texture")?;
        let files_url = format!("{}/files/{}", API_BASE, id);
        let files = self.env.fetch_json(&files_url)?;
        let variants = texture_variants(&files, &files_url)?;
        let labels = variants.iter().map(TextureVariant::label).collect();

        let metadata = &mut self.state.metadata;
        metadata.name = name;
        metadata.id = id;
        let stored = serde_json::to_value(&variants)
            .map_err(|e| Error::api_shape(&files_url, e.to_string()))?;
        metadata.set_custom("variant_data", stored);
        Ok(labels)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (i, variant) = self.checked_variant(index)?;
        let fetch_url = self.state.metadata.fetch_url.clone();
        let data: Vec<TextureVariant> = self
            .state
            .metadata
            .get_custom("variant_data")
            .ok_or_else(|| Error::api_shape(&fetch_url, "variant data missing from metadata"))?;
        let selected = data
            .get(i)
            .ok_or_else(|| Error::api_shape(&fetch_url, format!("no data for variant {}", variant)))?;

        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;

        // Several Poly Haven types can map to one host name; keep the first
        // so that no two workers write the same file.
        let mut requests: Vec<FetchRequest<&'static str>> = Vec::new();
        for (map_type, map_url) in &selected.maps {
            let Some(map_name) = translate(MAPS_TR, &map_type.to_lowercase()) else {
                continue;
            };
            if requests.iter().any(|r| r.key == map_name) {
                continue;
            }
            let dest = dir.join(format!("{}{}", map_name, extension_from_url(map_url)));
            requests.push(FetchRequest::new(map_name, map_url.clone(), dest));
        }

        let mut fetched: Vec<(&'static str, PathBuf)> = Vec::with_capacity(requests.len());
        let mut first_error = None;
        for (map_name, result) in self
            .env
            .downloader
            .fetch_many_to_files(requests, self.state.reinstall)
        {
            match result {
                Ok(path) => fetched.push((map_name, path)),
                Err(e) => {
                    tracing::warn!("{}: {} failed: {}", variant, map_name, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }
        for (map_name, path) in fetched {
            maps.set_path(map_name, path);
        }
        Ok(())
    }

    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(Some(thumbnail_for(self.state.metadata.effective_id())))
    }
}

pub struct PolyHavenHdriScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl Scraper for PolyHavenHdriScraper {
    fn info(&self) -> &'static ScraperInfo {
        &HDRI_INFO
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
        let id = parse_asset_id(url).ok_or_else(|| Error::api_shape(url, "Bad Url"))?;
        let name = query_info(&self.env, &id, TYPE_HDRI, "an HDRI")?;
        let files_url = format!("{}/files/{}", API_BASE, id);
        let files = self.env.fetch_json(&files_url)?;
        let hdri = json::object_field(&files, "hdri", &files_url)?;

        let mut sky_urls = BTreeMap::new();
        for (res, formats) in hdri {
            let sky = ["hdr", "exr"].iter().find_map(|fmt| {
                formats
                    .get(*fmt)
                    .and_then(|f| f.get("url"))
                    .and_then(Value::as_str)
            });
            match sky {
                Some(sky) => {
                    sky_urls.insert(res.clone(), sky.to_string());
                }
                None => tracing::debug!("{}: no hdr/exr file at {}", id, res),
            }
        }
        let mut variants: Vec<String> = sky_urls.keys().cloned().collect();
        variants.sort_by(|a, b| natural_cmp(a, b));

        let metadata = &mut self.state.metadata;
        metadata.name = name;
        metadata.id = id;
        let stored = serde_json::to_value(&sky_urls)
            .map_err(|e| Error::api_shape(&files_url, e.to_string()))?;
        metadata.set_custom("sky_urls", stored);
        Ok(variants)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (_, variant) = self.checked_variant(index)?;
        let fetch_url = self.state.metadata.fetch_url.clone();
        let sky_urls: BTreeMap<String, String> = self
            .state
            .metadata
            .get_custom("sky_urls")
            .unwrap_or_default();
        let sky_url = sky_urls
            .get(&variant)
            .ok_or_else(|| Error::api_shape(&fetch_url, format!("no sky URL for {}", variant)))?;

        maps.set_name(self.maps_name(&variant));
        let dir = self.variant_dir(&variant)?;
        let dest = dir.join(format!("sky{}", extension_from_url(sky_url)));
        let path = self
            .env
            .downloader
            .fetch_to_file(sky_url, &dest, self.state.reinstall)?;
        maps.set_path("sky", path);
        Ok(())
    }

    fn thumbnail_url(&mut self) -> Result<Option<String>> {
        Ok(Some(thumbnail_for(self.state.metadata.effective_id())))
    }
}
