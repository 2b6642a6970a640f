//! Single-attempt file transfers and the policy deciding when to retry them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("wikidump-dl/", env!("CARGO_PKG_VERSION"));

/// Fetches one URL into one destination path.
///
/// Implementations must never leave `dest` behind on failure: readers treat
/// its mere existence as "downloaded".
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Downloads `url` to `dest`, returning the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Decides how long to wait before another attempt.
pub trait RetryPolicy: Send + Sync {
    /// Delay before the next attempt after `failures` consecutive failures,
    /// or `None` to abandon the task.
    fn next_delay(&self, failures: u64) -> Option<Duration>;
}

/// Retries forever, without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl RetryPolicy for Immediate {
    fn next_delay(&self, _failures: u64) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}

/// Returns the `.part` file path for a given final path.
#[must_use]
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Builds the HTTP client shared by every worker of a run.
///
/// # Errors
///
/// Returns an error if the proxy URL is invalid or the TLS backend fails
/// to initialize.
///
/// Only connecting and the gap between two body reads are bounded; a
/// shard that keeps streaming may take as long as it needs.
pub fn build_http_client(config: &DownloadConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30));
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    } else if !config.system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// Plain HTTP(S) GET transfer.
///
/// The body is streamed into `{dest}.part`, which is renamed onto `dest`
/// only after the whole body has been written and flushed.
#[derive(Debug, Clone)]
pub struct HttpTransfer<F: FileSystem = TokioFileSystem> {
    client: reqwest::Client,
    fs: F,
}

impl HttpTransfer<TokioFileSystem> {
    /// Creates a transfer using the default file system.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            fs: TokioFileSystem,
        }
    }
}

impl<F: FileSystem> HttpTransfer<F> {
    /// Creates a transfer with a custom file system implementation.
    #[must_use]
    pub const fn with_fs(client: reqwest::Client, fs: F) -> Self {
        Self { client, fs }
    }

    async fn write_body(&self, url: &str, part: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        let expected = response.content_length();

        let mut file = self.fs.create_file(part).await?;
        let mut received = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        if let Some(expected) = expected
            && received < expected
        {
            return Err(Error::Truncated {
                url: url.to_string(),
                expected,
                received,
            });
        }
        Ok(received)
    }

    async fn write_and_rename(&self, url: &str, part: &Path, dest: &Path) -> Result<u64> {
        let bytes = self.write_body(url, part).await?;
        self.fs.rename_file(part, dest).await?;
        Ok(bytes)
    }

    async fn discard_part(&self, part: &Path) {
        match self.fs.remove_file(part).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {e}", part.display()),
        }
    }
}

#[async_trait]
impl<F: FileSystem> Transfer for HttpTransfer<F> {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).await?;
        }

        let pp = part_path(dest);
        let result = self.write_and_rename(url, &pp, dest).await;
        if result.is_err() {
            self.discard_part(&pp).await;
        }
        result
    }
}
