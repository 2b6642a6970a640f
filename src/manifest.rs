//! `dumpstatus.json` model and retrieval.
//!
//! The manifest lists every job of a dump run. Only the meta-history jobs are
//! decoded strictly; the remaining jobs are kept as raw JSON since their
//! shapes vary between runs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumAlgorithm;
use crate::error::{Error, Result};
use crate::transfer::Transfer;

/// Compression flavour of the meta-history dump to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CompressType {
    /// `metahistory7zdump`
    #[default]
    #[serde(rename = "7z")]
    #[cfg_attr(feature = "cli", value(name = "7z"))]
    SevenZip,
    /// `metahistorybz2dump`
    #[serde(rename = "bz2")]
    #[cfg_attr(feature = "cli", value(name = "bz2"))]
    Bz2,
}

impl CompressType {
    /// Name of the manifest job holding this flavour.
    #[must_use]
    pub const fn job_name(self) -> &'static str {
        match self {
            Self::SevenZip => "metahistory7zdump",
            Self::Bz2 => "metahistorybz2dump",
        }
    }
}

impl fmt::Display for CompressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SevenZip => "7z",
            Self::Bz2 => "bz2",
        })
    }
}

impl FromStr for CompressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "7z" => Ok(Self::SevenZip),
            "bz2" => Ok(Self::Bz2),
            other => Err(Error::InvalidConfig(format!(
                "unknown compress type '{other}' (expected 7z or bz2)"
            ))),
        }
    }
}

/// One published shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpFile {
    /// Path below a mirror root, starting with `/`.
    pub url: String,
    /// Hex MD5 of the file.
    #[serde(default)]
    pub md5: Option<String>,
    /// Hex SHA-1 of the file.
    #[serde(default)]
    pub sha1: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

impl DumpFile {
    /// Expected digest for `algorithm`, if the manifest publishes one.
    #[must_use]
    pub fn checksum(&self, algorithm: ChecksumAlgorithm) -> Option<&str> {
        match algorithm {
            ChecksumAlgorithm::Md5 => self.md5.as_deref(),
            ChecksumAlgorithm::Sha1 => self.sha1.as_deref(),
        }
    }
}

/// A single job of the dump run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpJob {
    /// Job state as reported by the dump infrastructure (`done`, `in-progress`, ...).
    #[serde(default)]
    pub status: String,
    /// Shards keyed by filename.
    #[serde(default)]
    pub files: BTreeMap<String, DumpFile>,
}

impl DumpJob {
    /// Shards sorted by filename.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (&str, &DumpFile)> {
        self.files.iter().map(|(name, file)| (name.as_str(), file))
    }

    /// Returns true when the job has finished publishing.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == "done"
    }

    /// Total advertised size of all shards.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.values().filter_map(|f| f.size).sum()
    }
}

/// Parsed `dumpstatus.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    jobs: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Parses a manifest from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document is not a manifest.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    /// Decodes the meta-history job for `compress`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the job is absent and [`Error::Json`]
    /// if it does not have the expected shape.
    pub fn job(&self, compress: CompressType) -> Result<DumpJob> {
        let name = compress.job_name();
        let raw = self
            .jobs
            .get(name)
            .ok_or_else(|| {
                let known: Vec<_> = self.job_names().collect();
                Error::Manifest(format!(
                    "job '{name}' not found (manifest has: {})",
                    known.join(", ")
                ))
            })?;
        let job: DumpJob = serde_json::from_value(raw.clone())?;
        if !job.is_done() {
            log::warn!("Job {name} has status '{}', file list may be incomplete", job.status);
        }
        Ok(job)
    }

    /// Names of every job in the manifest.
    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }
}

/// Downloads the manifest to `dest` unless it is already there.
///
/// Returns `true` if a download happened.
///
/// # Errors
///
/// Any failure is returned as-is; a run cannot proceed without a manifest.
pub async fn fetch_manifest(transfer: &dyn Transfer, url: &str, dest: &Path) -> Result<bool> {
    if tokio::fs::try_exists(dest).await? {
        log::debug!("Manifest already present: {}", dest.display());
        return Ok(false);
    }
    log::info!("Fetching manifest {url}");
    transfer.fetch(url, dest).await?;
    Ok(true)
}
