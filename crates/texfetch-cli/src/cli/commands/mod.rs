//! CLI command handlers, one file per command.

mod fetch;
mod list;
mod providers;

pub use fetch::run_fetch;
pub use list::run_list;
pub use providers::run_providers;

use anyhow::Result;
use texfetch_core::{
    registry, AssetCategory, CacheDir, Downloader, ScrapedData, ScraperEnv, TexfetchConfig,
    LOCAL_SUBDIR_ASSET,
};

/// Source selection shared by `list` and `fetch`.
#[derive(Debug, Clone)]
pub struct SessionArgs {
    pub url: String,
    pub category: AssetCategory,
    pub asset: Option<String>,
    pub deep: bool,
}

/// Session over the built-in providers, caching under the configured root
/// (relative roots resolve against the working directory).
fn open_session(cfg: &TexfetchConfig, args: &SessionArgs) -> Result<ScrapedData> {
    let root = cfg.texture_root(&std::env::current_dir()?)?;
    tracing::debug!("cache root {}", root.display());
    let env = ScraperEnv::new(Downloader::from_config(cfg), CacheDir::new(root));
    let registry = registry::global();

    let asset = if args.deep {
        Some(LOCAL_SUBDIR_ASSET)
    } else {
        args.asset.as_deref()
    };
    Ok(match asset {
        Some(name) => ScrapedData::from_asset_name(registry, env, &args.url, name, args.category),
        None => ScrapedData::new(registry, env, &args.url, args.category),
    })
}
