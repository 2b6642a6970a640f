//! Configuration types for download runs.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML
//! config file, and command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumAlgorithm;
use crate::error::Result;
use crate::manifest::CompressType;
use crate::mirror::WIKIMEDIA_MIRRORS;

/// Configuration for download and verification runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Number of concurrent workers.
    pub threads: usize,
    /// Which meta-history dump flavour to fetch.
    pub compress: CompressType,
    /// Digest used by the verification pass.
    pub checksum: ChecksumAlgorithm,
    /// Wiki database name, e.g. `enwiki`.
    pub wiki: String,
    /// Proxy URL for every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` when no explicit proxy is set.
    pub system_proxy: bool,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Longest gap between body reads, in seconds, before a transfer fails.
    pub read_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            threads: 3,
            compress: CompressType::SevenZip,
            checksum: ChecksumAlgorithm::Md5,
            wiki: "enwiki".to_string(),
            proxy: None,
            system_proxy: true,
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of workers.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the dump flavour.
    #[must_use]
    pub const fn with_compress(mut self, compress: CompressType) -> Self {
        self.compress = compress;
        self
    }

    /// Sets the verification digest.
    #[must_use]
    pub const fn with_checksum(mut self, checksum: ChecksumAlgorithm) -> Self {
        self.checksum = checksum;
        self
    }

    /// Sets the wiki database name.
    #[must_use]
    pub fn with_wiki(mut self, wiki: impl Into<String>) -> Self {
        self.wiki = wiki.into();
        self
    }

    /// Sets the proxy URL.
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Sets whether `HTTP_PROXY`/`HTTPS_PROXY` are honoured.
    #[must_use]
    pub const fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    /// Sets the idle read timeout in seconds.
    #[must_use]
    pub const fn with_read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }
}

/// Where dumps are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root directory; each version gets a subdirectory.
    pub data_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Where dumps are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Host serving `dumpstatus.json`.
    pub manifest_host: String,
    /// Mirrors used for shard downloads, in rotation order.
    pub urls: Vec<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            manifest_host: WIKIMEDIA_MIRRORS[0].to_string(),
            urls: WIKIMEDIA_MIRRORS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download configuration.
    pub download: DownloadConfig,
    /// Path configuration.
    pub paths: PathConfig,
    /// Mirror configuration.
    pub mirrors: MirrorConfig,
}

impl AppConfig {
    /// Per-user config file location, e.g. `~/.config/wikidump-dl/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wikidump-dl").join("config.toml"))
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from `path`, or from [`default_path`](Self::default_path)
    /// when that file exists, or falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any
    /// config file cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        log::debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        Self::from_toml(&text)
    }
}
