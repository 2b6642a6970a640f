//! Download session statistics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::download::DownloadProgress;
use crate::error::Error;
use crate::queue::Claim;

/// Statistics for an entire download session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of files transferred.
    pub files_downloaded: usize,
    /// Number of files skipped (already existed).
    pub files_skipped: usize,
    /// Number of files abandoned by the retry policy.
    pub files_failed: usize,
    /// Number of failed transfer attempts.
    pub retries: u64,
    /// Total bytes transferred.
    pub total_bytes: u64,
    /// Total elapsed time for the session.
    pub elapsed: Duration,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    /// Creates a new empty session stats.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files_downloaded: 0,
            files_skipped: 0,
            files_failed: 0,
            retries: 0,
            total_bytes: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns the average download speed in bytes per second.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn average_speed(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.total_bytes as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Lock-free accumulator fed by worker events.
#[derive(Debug)]
pub struct SessionStatsTracker {
    start_time: Instant,
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    retries: AtomicU64,
    bytes: AtomicU64,
}

impl Default for SessionStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStatsTracker {
    /// Creates a tracker whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            downloaded: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            retries: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
        }
    }

    /// Number of tasks finished so far, whatever the outcome.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.downloaded.load(Ordering::Relaxed)
            + self.skipped.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed)
    }

    /// Captures the current counters.
    #[must_use]
    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            files_downloaded: self.downloaded.load(Ordering::Relaxed),
            files_skipped: self.skipped.load(Ordering::Relaxed),
            files_failed: self.failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            total_bytes: self.bytes.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl DownloadProgress for SessionStatsTracker {
    fn on_skip(&self, _worker: usize, _claim: &Claim) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn on_retry(&self, _worker: usize, _claim: &Claim, _error: &Error, _failures: u64) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    fn on_complete(&self, _worker: usize, _claim: &Claim, bytes: u64) {
        self.downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_give_up(&self, _worker: usize, _claim: &Claim, _error: &Error) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Task;
    use std::path::PathBuf;

    fn claim() -> Claim {
        Claim {
            task: Task {
                name: "a.7z".into(),
                remote_path: "/enwiki/20240101/a.7z".into(),
                local_path: PathBuf::from("a.7z"),
            },
            position: 1,
            total: 1,
        }
    }

    #[test]
    fn session_stats_default() {
        let stats = SessionStats::default();
        assert_eq!(stats.files_downloaded, 0);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn session_stats_average_speed_zero_elapsed() {
        let stats = SessionStats {
            total_bytes: 1000,
            ..SessionStats::new()
        };
        assert_eq!(stats.average_speed(), 0);
    }

    #[test]
    fn session_stats_average_speed() {
        let stats = SessionStats {
            files_downloaded: 1,
            total_bytes: 1000,
            elapsed: Duration::from_secs(2),
            ..SessionStats::new()
        };
        assert_eq!(stats.average_speed(), 500);
    }

    #[test]
    fn tracker_counts_events() {
        let tracker = SessionStatsTracker::new();
        let claim = claim();
        let err = Error::Manifest("x".into());

        tracker.on_retry(0, &claim, &err, 1);
        tracker.on_retry(0, &claim, &err, 2);
        tracker.on_complete(0, &claim, 300);
        tracker.on_complete(1, &claim, 200);
        tracker.on_skip(1, &claim);
        tracker.on_give_up(2, &claim, &err);

        let stats = tracker.snapshot();
        assert_eq!(stats.files_downloaded, 2);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.total_bytes, 500);
        assert_eq!(tracker.finished(), 4);
    }
}
