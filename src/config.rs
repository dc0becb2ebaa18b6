use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Remote API defaults
// =============================================================================

/// Static data API host
pub const DEFAULT_BASE_URL: &str = "https://global.api.pvp.net";

/// Region whose static data is mirrored
pub const DEFAULT_REGION: &str = "na";

/// Static data API version segment
pub const DEFAULT_API_VERSION: &str = "v1.2";

/// Environment variable that overrides `api.apiKey`
pub const API_KEY_ENV: &str = "DDRAGON_API_KEY";

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single HTTP request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Bound on fetching the remote and local realm versions (60 seconds)
pub const VERSION_TIMEOUT_MS: u64 = 60_000;

// =============================================================================
// Image cache
// =============================================================================

/// Maximum number of image fetches in flight at once
pub const IMAGE_BATCH_SIZE: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub sync: SyncSettings,
}

/// Static data API connection settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub region: String,
    pub api_version: String,
    /// Per-request timeout in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            region: DEFAULT_REGION.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

/// Image cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub image_batch_size: usize,
    /// Directory for cached images, `image_dir()` when unset
    pub image_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image_batch_size: IMAGE_BATCH_SIZE,
            image_dir: None,
        }
    }
}

impl CacheConfig {
    pub fn resolved_image_dir(&self) -> PathBuf {
        self.image_dir.clone().unwrap_or_else(image_dir)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub version_timeout_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            version_timeout_ms: VERSION_TIMEOUT_MS,
        }
    }
}

impl SyncConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the environment
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(api_key) = api_key.filter(|key| !key.is_empty()) {
            self.api.api_key = api_key;
        }
        self
    }
}

/// Returns the path to the data directory for ddragon-sync.
/// Uses $XDG_DATA_HOME/ddragon-sync if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/ddragon-sync,
/// or ./ddragon-sync if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("ddragon.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("ddragon-sync.log")
}

/// Returns the default image cache directory.
pub fn image_dir() -> PathBuf {
    data_dir().join("images")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("ddragon-sync")
}
