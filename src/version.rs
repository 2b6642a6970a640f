//! Versioned on-disk layout of a dump run.

use std::path::{Path, PathBuf};

use chrono::Datelike;

/// Manifest filename inside a version directory.
pub const MANIFEST_FILE: &str = "dumpstatus.json";
/// Completion marker filename inside a version directory.
pub const MARKER_FILE: &str = "COMPLETE.txt";

/// Dump run tag for the month containing `date`, e.g. `20240101`.
///
/// Full-history dumps are started on the first of the month.
#[must_use]
pub fn version_tag(date: impl Datelike) -> String {
    format!("{:04}{:02}01", date.year(), date.month())
}

/// Paths and URLs for one wiki/version pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLayout {
    dir: PathBuf,
    wiki: String,
    tag: String,
}

impl VersionLayout {
    /// Places version `tag` of `wiki` under `data_dir/tag`.
    #[must_use]
    pub fn new(data_dir: &Path, wiki: &str, tag: &str) -> Self {
        Self {
            dir: data_dir.join(tag),
            wiki: wiki.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Directory receiving the shards.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Version tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(MARKER_FILE)
    }

    /// Manifest location on `host`.
    #[must_use]
    pub fn manifest_url(&self, host: &str) -> String {
        format!(
            "{}/{}/{}/{MANIFEST_FILE}",
            host.trim_end_matches('/'),
            self.wiki,
            self.tag
        )
    }

    /// Creates the version directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }
}
