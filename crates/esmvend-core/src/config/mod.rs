//! Global settings (`~/.config/esmvend/config.toml`) and per-job files.

mod job;

pub use job::{load_job_file, EntryUrls, JobFile};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP settings for module fetches (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum redirects followed per fetch.
    pub max_redirects: u32,
    /// Optional User-Agent header (None = libcurl default).
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 300,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/esmvend/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Maximum number of modules loaded concurrently by the bundler.
    pub max_concurrent_loads: usize,
    /// Prefix joined to each local path to form an import map address.
    pub import_map_base: String,
    /// Optional fetch settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 8,
            import_map_base: "./".to_string(),
            fetch: None,
        }
    }
}

impl VendorConfig {
    /// Fetch settings with defaults filled in.
    pub fn fetch_config(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("esmvend")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VendorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VendorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VendorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
