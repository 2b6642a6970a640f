//! wikidump-dl - A library for bulk-downloading Wikipedia history dumps.
//!
//! A dump run is described by its `dumpstatus.json` manifest. The shards of
//! one meta-history job are queued in filename order and drained by a fixed
//! pool of workers, each rotating through a list of mirrors and retrying
//! failed transfers. A separate pass verifies every shard against the
//! manifest checksums.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use wikidump_dl::{
//!     CompressType, Coordinator, DownloadConfig, DownloadProgress, HttpTransfer, Manifest,
//!     MirrorSelector, NoProgress, TaskRange, build_http_client, build_tasks,
//! };
//!
//! # async fn example() -> wikidump_dl::Result<()> {
//! let client = build_http_client(&DownloadConfig::default())?;
//! let transfer = Arc::new(HttpTransfer::new(client));
//!
//! let manifest = Manifest::load(Path::new("data/20240101/dumpstatus.json"))?;
//! let job = manifest.job(CompressType::SevenZip)?;
//! let tasks = build_tasks(&job, Path::new("data/20240101"), TaskRange::default());
//!
//! let coordinator = Coordinator::new(3, MirrorSelector::wikimedia(), transfer)?;
//! let progress: Arc<dyn DownloadProgress> = Arc::new(NoProgress);
//! coordinator.run(tasks, &progress).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod checksum;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod fs;
pub mod manifest;
pub mod marker;
pub mod mirror;
pub mod queue;
pub mod stats;
pub mod transfer;
pub mod verify;
pub mod version;
pub mod worker;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types for convenience
pub use checksum::{ChecksumAlgorithm, file_digest};
pub use config::{AppConfig, DownloadConfig, MirrorConfig, PathConfig};
pub use download::{Coordinator, DownloadProgress, NoProgress, TaskRange, build_tasks};
pub use error::{Error, Result};
pub use format::{format_bytes, format_duration, format_elapsed};
pub use fs::{FileSystem, TokioFileSystem};
pub use manifest::{CompressType, DumpFile, DumpJob, Manifest, fetch_manifest};
pub use marker::{read_marker, write_marker};
pub use mirror::{MirrorSelector, WIKIMEDIA_MIRRORS};
pub use queue::{Claim, Task, TaskQueue};
pub use stats::{SessionStats, SessionStatsTracker};
pub use transfer::{HttpTransfer, Immediate, RetryPolicy, Transfer, build_http_client};
pub use verify::{VerifyReport, verify};
pub use version::{VersionLayout, version_tag};
pub use worker::{Worker, WorkerContext};
