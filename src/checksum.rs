//! Content digests of downloaded shards.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Read size used while hashing; dump shards run to tens of gigabytes.
const BUF_SIZE: usize = 8 * 1024 * 1024;

/// Digest used to check shards against the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ChecksumAlgorithm {
    /// MD5, the digest every manifest publishes.
    #[default]
    Md5,
    /// SHA-1.
    Sha1,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        })
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            other => Err(Error::InvalidConfig(format!(
                "unknown checksum '{other}' (expected md5 or sha1)"
            ))),
        }
    }
}

fn digest_reader<D: Digest>(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Computes the lowercase hex digest of a file. Blocking.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn file_digest(path: &Path, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let file = File::open(path)?;
    match algorithm {
        ChecksumAlgorithm::Md5 => digest_reader::<Md5>(file),
        ChecksumAlgorithm::Sha1 => digest_reader::<Sha1>(file),
    }
}

/// Computes a file digest on the blocking thread pool.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the hashing task dies.
pub async fn file_digest_async(path: PathBuf, algorithm: ChecksumAlgorithm) -> Result<String> {
    tokio::task::spawn_blocking(move || file_digest(&path, algorithm))
        .await
        .map_err(|e| Error::Worker(format!("checksum task failed: {e}")))?
        .map_err(Error::Io)
}

/// Compares two hex digests, ignoring case.
#[must_use]
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}
