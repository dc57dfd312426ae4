//! Files already on disk. Nothing is downloaded; map names are guessed from
//! file names.
//!
//! Without `deep_check` the given path is the single variant. With it, the
//! path is a container: sub-directories are materials, `.hdr`/`.exr`/`.hdri`
//! files are worlds and `.ies` files are lights.

use std::fs;
use std::path::{Path, PathBuf};

use crate::category::{AssetCategory, CategorySet};
use crate::error::{Error, Result};
use crate::maps::Maps;
use crate::registry::ScraperEntry;
use crate::scraper::{natural_cmp, Scraper, ScraperEnv, ScraperInfo, ScraperState};

pub static INFO: ScraperInfo = ScraperInfo {
    name: "local",
    source_name: "Local Directory",
    home_url: None,
    home_dir: "local",
    categories: CategorySet::ALL,
};

/// Substrings of file stems and the map each one indicates. When several
/// match, the longest wins (`NormalGL` over `Normal`).
const NAME_HINTS: &[(&str, &str)] = &[
    ("baseColor", "baseColor"),
    ("metallic", "metallic"),
    ("height", "height"),
    ("normalInvertedY", "normalInvertedY"),
    ("opacity", "opacity"),
    ("roughness", "roughness"),
    ("ambientOcclusion", "ambientOcclusion"),
    ("normal", "normal"),
    ("Base Color", "baseColor"),
    ("diffuse", "diffuse"),
    ("Metallic", "metallic"),
    ("Height", "height"),
    ("col", "baseColor"),
    ("nrm", "normalInvertedY"),
    ("mask", "opacity"),
    ("rgh", "roughness"),
    ("met", "metallic"),
    ("AO", "ambientOcclusion"),
    ("disp", "height"),
    ("Color", "baseColor"),
    ("Normal", "normalInvertedY"),
    ("NormalGL", "normal"),
    ("Opacity", "opacity"),
    ("Roughness", "roughness"),
    ("Metalness", "metallic"),
    ("AmbientOcclusion", "ambientOcclusion"),
    ("Displacement", "height"),
];

const WORLD_EXTENSIONS: &[&str] = &["hdr", "exr", "hdri"];
const LIGHT_EXTENSIONS: &[&str] = &["ies"];

pub fn entry() -> ScraperEntry {
    ScraperEntry {
        info: &INFO,
        can_handle_url,
        build,
    }
}

fn build(env: ScraperEnv, state: ScraperState) -> Box<dyn Scraper> {
    Box::new(LocalDirectoryScraper { env, state })
}

fn can_handle_url(url: &str) -> bool {
    let path = Path::new(url);
    path.is_dir() || path.is_file()
}

fn guess_map_name(stem: &str) -> Option<&'static str> {
    NAME_HINTS
        .iter()
        .filter(|(hint, _)| stem.contains(hint))
        .max_by_key(|(hint, _)| hint.len())
        .map(|(_, map)| *map)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Entries of `dir` accepted by `keep`, sorted by file name.
fn children(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if keep(&path) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| natural_cmp(&file_label(a), &file_label(b)));
    Ok(out)
}

fn not_a_file(path: &Path, what: &str) -> Error {
    Error::io(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("not {}", what)),
    )
}

pub struct LocalDirectoryScraper {
    env: ScraperEnv,
    state: ScraperState,
}

impl LocalDirectoryScraper {
    fn candidate_paths(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !self.state.deep_check {
            return Ok(vec![root.to_path_buf()]);
        }
        match self.state.category {
            AssetCategory::Material => children(root, Path::is_dir),
            AssetCategory::World => children(root, |p| p.is_file() && has_extension(p, WORLD_EXTENSIONS)),
            AssetCategory::Light => children(root, |p| p.is_file() && has_extension(p, LIGHT_EXTENSIONS)),
        }
    }

    /// `<parent>/<name>`, with the grandparent too for container scans.
    fn display_name(&self, path: &Path) -> String {
        let mut parts = vec![file_label(path)];
        let mut cursor = path.parent();
        let depth = if self.state.deep_check { 2 } else { 1 };
        for _ in 0..depth {
            if let Some(dir) = cursor {
                if dir.file_name().is_some() {
                    parts.push(file_label(dir));
                }
                cursor = dir.parent();
            }
        }
        parts.reverse();
        parts.join("/")
    }
}

impl Scraper for LocalDirectoryScraper {
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

    fn asset_id(&self, _url: &str) -> Option<String> {
        None
    }

    fn query_variants(&mut self, url: &str) -> Result<Vec<String>> {
        let root = Path::new(url);
        let paths = self.candidate_paths(root)?;
        let labels: Vec<String> = if self.state.deep_check {
            paths.iter().map(|p| file_label(p)).collect()
        } else {
            paths.iter().map(|p| p.display().to_string()).collect()
        };
        let path_strings: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();

        let metadata = &mut self.state.metadata;
        metadata.name = file_label(root);
        metadata.id = metadata.name.clone();
        metadata.set_custom("paths", path_strings);
        Ok(labels)
    }

    /// Local listings are cheap and always current, so never cached.
    fn get_variant_list(&mut self, url: &str) -> Result<Vec<String>> {
        let variants = self.query_variants(url)?;
        if variants.is_empty() {
            return Err(Error::NoVariants);
        }
        let metadata = &mut self.state.metadata;
        metadata.scraper_name = INFO.name.to_string();
        metadata.fetch_url = url.to_string();
        metadata.variants = variants.clone();
        Ok(variants)
    }

    fn is_downloaded(&self, variant: &str) -> bool {
        let paths: Vec<String> = self.state.metadata.get_custom("paths").unwrap_or_default();
        let variants = &self.state.metadata.variants;
        variants
            .iter()
            .position(|v| v == variant)
            .and_then(|i| paths.get(i))
            .map(|p| Path::new(p).exists())
            .unwrap_or(false)
    }

    fn fetch_variant(&mut self, index: isize, maps: &mut Maps) -> Result<()> {
        let (i, _) = self.checked_variant(index)?;
        let paths: Vec<String> = self.state.metadata.get_custom("paths").unwrap_or_default();
        let path = paths
            .get(i)
            .map(PathBuf::from)
            .ok_or_else(|| Error::api_shape(&self.state.metadata.fetch_url, "paths missing from metadata"))?;
        maps.set_name(self.display_name(&path));

        match self.state.category {
            AssetCategory::Material => {
                let files = if path.is_dir() {
                    children(&path, Path::is_file)?
                } else {
                    vec![path.clone()]
                };
                for file in files {
                    let stem = file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    if let Some(map_name) = guess_map_name(&stem) {
                        maps.set_path(map_name, file);
                    }
                }
            }
            AssetCategory::World => {
                if !path.is_file() {
                    return Err(not_a_file(&path, "a world file"));
                }
                maps.set_path("sky", path);
            }
            AssetCategory::Light => {
                if !path.is_file() {
                    return Err(not_a_file(&path, "an IES file"));
                }
                maps.set_path("ies", path);
                maps.set_scalar("energy", 1.0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDir;
    use crate::downloader::Downloader;
    use crate::http::{BodySink, HttpRequest, HttpResponse, Transport};
    use crate::retry::FetchError;
    use std::sync::Arc;

    struct Offline;

    impl Transport for Offline {
        fn get(&self, req: &HttpRequest, _sink: &mut BodySink<'_>) -> std::result::Result<HttpResponse, FetchError> {
            panic!("local scraper went online: {}", req.url);
        }
    }

    fn scraper(category: AssetCategory, deep: bool, cache: &Path) -> LocalDirectoryScraper {
        let env = ScraperEnv::new(Downloader::new(Arc::new(Offline)), CacheDir::new(cache));
        let mut state = ScraperState::new(category);
        state.deep_check = deep;
        LocalDirectoryScraper { env, state }
    }

    #[test]
    fn guesses_map_names() {
        assert_eq!(guess_map_name("Rock_AmbientOcclusion"), Some("ambientOcclusion"));
        assert_eq!(guess_map_name("Rock_NormalGL"), Some("normal"));
        assert_eq!(guess_map_name("Rock_Normal"), Some("normalInvertedY"));
        assert_eq!(guess_map_name("Rock_Color"), Some("baseColor"));
        assert_eq!(guess_map_name("readme"), None);
    }

    #[test]
    fn material_directory_as_single_variant() {
        let tmp = tempfile::tempdir().unwrap();
        let mat = tmp.path().join("Rock");
        fs::create_dir(&mat).unwrap();
        fs::write(mat.join("Rock_Color.png"), b"c").unwrap();
        fs::write(mat.join("Rock_Roughness.png"), b"r").unwrap();
        fs::write(mat.join("notes.txt"), b"n").unwrap();

        let url = mat.display().to_string();
        let mut s = scraper(AssetCategory::Material, false, &tmp.path().join("cache"));
        assert_eq!(s.get_variant_list(&url).unwrap(), vec![url.clone()]);
        assert!(s.is_downloaded(&url));

        let mut maps = Maps::new(AssetCategory::Material);
        s.fetch_variant(0, &mut maps).unwrap();
        assert_eq!(maps.path("baseColor"), Some(mat.join("Rock_Color.png").as_path()));
        assert_eq!(maps.path("roughness"), Some(mat.join("Rock_Roughness.png").as_path()));
        assert_eq!(maps.len(), 2);
        assert!(!tmp.path().join("cache").exists());
    }

    #[test]
    fn deep_scan_lists_worlds() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b_sky.EXR"), b"x").unwrap();
        fs::write(tmp.path().join("a_sky.hdr"), b"x").unwrap();
        fs::write(tmp.path().join("c.png"), b"x").unwrap();

        let mut s = scraper(AssetCategory::World, true, &tmp.path().join("cache"));
        let variants = s.get_variant_list(&tmp.path().display().to_string()).unwrap();
        assert_eq!(variants, ["a_sky.hdr", "b_sky.EXR"]);

        let mut maps = Maps::new(AssetCategory::World);
        s.fetch_variant(1, &mut maps).unwrap();
        assert_eq!(maps.path("sky"), Some(tmp.path().join("b_sky.EXR").as_path()));
        assert!(s.fetch_variant(2, &mut maps).is_err());
    }

    #[test]
    fn empty_container_has_no_variants() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = scraper(AssetCategory::Light, true, &tmp.path().join("cache"));
        let e = s.get_variant_list(&tmp.path().display().to_string()).unwrap_err();
        assert!(matches!(e, Error::NoVariants));
    }
}
