use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 5,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/texfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TexfetchConfig {
    /// Root of the texture cache. Empty or missing means the XDG data dir.
    /// A leading `//` marks a path relative to the caller's base directory.
    #[serde(default)]
    pub texture_dir: Option<String>,
    /// Worker threads for multi-file fetches (None = available parallelism x 2).
    #[serde(default)]
    pub max_workers: Option<usize>,
    /// Wall-clock timeout in seconds for API requests.
    pub request_timeout_secs: u64,
    /// Payload downloads are abandoned after this many seconds below 1 KiB/s.
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// User-Agent sent with every request; providers reject curl's default.
    pub user_agent: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_stall_timeout_secs() -> u64 {
    60
}

impl Default for TexfetchConfig {
    fn default() -> Self {
        Self {
            texture_dir: None,
            max_workers: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 15,
            stall_timeout_secs: default_stall_timeout_secs(),
            user_agent: "Mozilla/5.0".to_string(),
            retry: None,
        }
    }
}

impl TexfetchConfig {
    pub fn worker_count(&self) -> usize {
        match self.max_workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get() * 2)
                .unwrap_or(4),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    /// Resolve the cache root. Relative paths (and `//`-prefixed ones) are
    /// joined onto `base`, typically the directory of the host's project file.
    pub fn texture_root(&self, base: &Path) -> Result<PathBuf> {
        let configured = self
            .texture_dir
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let Some(dir) = configured else {
            return default_texture_root();
        };
        let dir = dir.strip_prefix("//").unwrap_or(dir);
        let path = Path::new(dir);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(base.join(path))
        }
    }
}

/// `~/.local/share/texfetch/textures`.
pub fn default_texture_root() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("texfetch")?;
    Ok(xdg_dirs.get_data_home().join("textures"))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("texfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TexfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TexfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TexfetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
