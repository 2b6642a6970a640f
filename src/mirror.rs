//! Round-robin selection over interchangeable dump mirrors.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// Mirrors serving the Wikimedia dump tree under identical paths.
pub const WIKIMEDIA_MIRRORS: &[&str] = &[
    "https://dumps.wikimedia.org",
    "https://wikimedia.bringyour.com",
    "https://wikipedia.c3sl.ufpr.br",
    "https://mirror.clarkson.edu",
    "https://wikimedia.mirror.clarkson.edu",
    "https://wikipedia.mirror.pdapps.org",
];

/// Hands out base URLs in round-robin order.
///
/// The cursor advances before each read, so the first call returns the
/// second mirror and the first mirror comes up once the list wraps.
#[derive(Debug)]
pub struct MirrorSelector {
    mirrors: Vec<String>,
    cursor: AtomicUsize,
}

impl MirrorSelector {
    /// Creates a selector over `mirrors`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `mirrors` is empty.
    pub fn new<I, S>(mirrors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mirrors: Vec<String> = mirrors
            .into_iter()
            .map(|m| m.into().trim_end_matches('/').to_string())
            .collect();
        if mirrors.is_empty() {
            return Err(Error::InvalidConfig("at least one mirror is required".into()));
        }
        Ok(Self {
            mirrors,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Creates a selector over [`WIKIMEDIA_MIRRORS`].
    #[must_use]
    pub fn wikimedia() -> Self {
        Self {
            mirrors: WIKIMEDIA_MIRRORS.iter().map(ToString::to_string).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Advances the cursor and returns the mirror it now points at.
    pub fn next_mirror(&self) -> &str {
        let len = self.mirrors.len();
        let advance = |c: usize| Some((c + 1) % len);
        // The closure never returns None, so both arms carry the previous cursor.
        let previous = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, advance)
        {
            Ok(c) | Err(c) => c,
        };
        &self.mirrors[(previous + 1) % len]
    }

    /// Joins the next mirror with a path from the manifest.
    #[must_use]
    pub fn resolve(&self, remote_path: &str) -> String {
        let base = self.next_mirror();
        if remote_path.starts_with('/') {
            format!("{base}{remote_path}")
        } else {
            format!("{base}/{remote_path}")
        }
    }

    /// The configured mirrors, in rotation order.
    #[must_use]
    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }
}
