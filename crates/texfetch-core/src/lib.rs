//! texfetch core: resolve texture, HDRI and IES sources into local files.
//!
//! A [`ScrapedData`] session picks a provider from the [`ScraperRegistry`]
//! for a URL, lists the asset's variants (cached in a `.meta` side-car under
//! the [`CacheDir`]) and downloads the selected one through the
//! [`Downloader`], returning [`Maps`] of file paths.

pub mod cache;
pub mod category;
pub mod config;
pub mod control;
pub mod downloader;
pub mod error;
pub mod http;
pub mod logging;
pub mod maps;
pub mod metadata;
pub mod registry;
pub mod retry;
pub mod scraper;
pub mod session;
pub mod storage;
pub mod url_model;

pub use cache::CacheDir;
pub use category::{AssetCategory, CategorySet};
pub use config::TexfetchConfig;
pub use control::CancelToken;
pub use downloader::{Downloader, FetchRequest, FetchStream};
pub use error::{Error, ErrorKind, Result};
pub use maps::{MapValue, Maps};
pub use metadata::Metadata;
pub use registry::{ScraperEntry, ScraperRegistry};
pub use scraper::{ApiCache, Scraper, ScraperEnv, ScraperInfo, ScraperState};
pub use session::{ScrapedData, SessionState, LOCAL_SUBDIR_ASSET};
