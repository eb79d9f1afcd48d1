//! Configuration management for NetMirror

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheStorage, DEFAULT_GENERATION};
use crate::client::http::{DEFAULT_API_HOST, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_TIMEOUT_SECS};
use crate::error::{ConfigError, Result};
use crate::output::{DisplayConfig, Vendor};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend serving `/api/asn/{asn}.json`
    #[serde(default = "default_api_host")]
    pub api_host: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Offline cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache epoch; changing it installs a fresh generation on next run
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Root-relative paths pre-cached when a generation is installed
    #[serde(default)]
    pub assets: Vec<String>,

    /// Override for the cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Default rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub vendor: Vendor,

    #[serde(default = "default_true")]
    pub merge: bool,

    #[serde(default = "default_true")]
    pub ipv4: bool,

    #[serde(default = "default_true")]
    pub ipv6: bool,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Backend request quota; 0 (the default) means unlimited
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_generation() -> String {
    DEFAULT_GENERATION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generation: default_generation(),
            assets: Vec::new(),
            dir: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::default(),
            merge: true,
            ipv4: true,
            ipv6: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".netmirror").join("config.yaml"))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load_from(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound(p))) => {
                log::debug!("No config at {}, using defaults", p);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Reject values that would make every run fail
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.api_host).is_err() {
            return Err(ConfigError::Invalid(format!("api_host '{}' is not a URL", self.api_host)).into());
        }
        if self.cache.generation.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.generation must not be empty".to_string()).into());
        }
        if let Some(asset) = self.cache.assets.iter().find(|a| !a.starts_with('/')) {
            return Err(ConfigError::Invalid(format!(
                "cache asset '{}' must be a root-relative path",
                asset
            ))
            .into());
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".to_string()).into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Display settings seeded from the `output` section
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            vendor: self.output.vendor,
            merge: self.output.merge,
            show_ipv4: self.output.ipv4,
            show_ipv6: self.output.ipv6,
        }
    }

    /// Cache directory: explicit override, then `cache.dir`, then the platform default
    pub fn resolve_cache_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        match override_dir.or(self.cache.dir.as_deref()) {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Ok(CacheStorage::cache_dir()?),
        }
    }
}
