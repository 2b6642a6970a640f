//! Download run orchestration: task list construction and the worker pool.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::manifest::DumpJob;
use crate::mirror::MirrorSelector;
use crate::queue::{Claim, Task, TaskQueue};
use crate::transfer::{Immediate, RetryPolicy, Transfer};
use crate::worker::{Worker, WorkerContext};

/// Trait for receiving download progress updates.
///
/// Implement this trait to receive callbacks from workers. Callbacks run on
/// the worker that produced the event, so they may be called concurrently.
/// All methods have default no-op implementations for convenience.
pub trait DownloadProgress: Send + Sync {
    /// Called when a worker claims a task.
    fn on_task_start(&self, _worker: usize, _claim: &Claim) {}

    /// Called when the destination already exists and the task is skipped.
    fn on_skip(&self, _worker: usize, _claim: &Claim) {}

    /// Called after each failed transfer attempt.
    fn on_retry(&self, _worker: usize, _claim: &Claim, _error: &Error, _failures: u64) {}

    /// Called once when a task's file has been placed on disk.
    fn on_complete(&self, _worker: usize, _claim: &Claim, _bytes: u64) {}

    /// Called when the retry policy abandons a task.
    fn on_give_up(&self, _worker: usize, _claim: &Claim, _error: &Error) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// 1-based inclusive slice of the sorted manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRange {
    /// First entry to include; 0 is treated as 1.
    pub start: usize,
    /// Last entry to include; `None`, 0, or past the end means "to the end".
    pub end: Option<usize>,
}

impl Default for TaskRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }
}

impl TaskRange {
    #[must_use]
    pub const fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Applies the range to `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let len = items.len();
        let lo = self.start.saturating_sub(1).min(len);
        let hi = self
            .end
            .filter(|&end| end > 0 && end <= len)
            .unwrap_or(len)
            .max(lo);
        &items[lo..hi]
    }
}

/// Builds the ordered task list for `job`, placing files under `dir`.
///
/// Entries are sorted by filename, then sliced by `range`. Filenames are
/// manifest keys, so every task has its own destination path.
#[must_use]
pub fn build_tasks(job: &DumpJob, dir: &Path, range: TaskRange) -> Vec<Task> {
    let entries: Vec<_> = job.entries().collect();
    range
        .slice(&entries)
        .iter()
        .map(|(name, file)| Task {
            name: (*name).to_string(),
            remote_path: file.url.clone(),
            local_path: dir.join(name),
        })
        .collect()
}

/// Runs a fixed pool of workers over one task list.
pub struct Coordinator {
    threads: usize,
    mirrors: Arc<MirrorSelector>,
    transfer: Arc<dyn Transfer>,
    fs: Arc<dyn FileSystem>,
    retry: Arc<dyn RetryPolicy>,
}

impl Coordinator {
    /// Creates a coordinator running `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `threads` is zero.
    pub fn new(
        threads: usize,
        mirrors: MirrorSelector,
        transfer: Arc<dyn Transfer>,
    ) -> Result<Self> {
        if threads == 0 {
            return Err(Error::InvalidConfig("thread count must be at least 1".into()));
        }
        Ok(Self {
            threads,
            mirrors: Arc::new(mirrors),
            transfer,
            fs: Arc::new(TokioFileSystem),
            retry: Arc::new(Immediate),
        })
    }

    /// Replaces the retry policy (default: [`Immediate`]).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: Arc<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    /// Number of workers spawned per run.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Downloads every task and returns once all workers have finished.
    ///
    /// # Errors
    ///
    /// Task outcomes are reported through `progress` only. An error is
    /// returned when a worker stopped on a local I/O failure or panicked;
    /// the remaining workers still drain the queue first.
    pub async fn run(&self, tasks: Vec<Task>, progress: &Arc<dyn DownloadProgress>) -> Result<()> {
        let ctx = Arc::new(WorkerContext {
            queue: TaskQueue::new(tasks),
            mirrors: Arc::clone(&self.mirrors),
            transfer: Arc::clone(&self.transfer),
            fs: Arc::clone(&self.fs),
            retry: Arc::clone(&self.retry),
            progress: Arc::clone(progress),
        });
        log::info!(
            "Downloading {} file(s) with {} worker(s) over {} mirror(s)",
            ctx.queue.total(),
            self.threads,
            self.mirrors.mirrors().len()
        );

        let handles: Vec<_> = (0..self.threads)
            .map(|id| tokio::spawn(Worker::new(id, Arc::clone(&ctx)).run()))
            .collect();

        log::debug!("Waiting for worker tasks");
        let mut first_error = None;
        for (id, joined) in futures::future::join_all(handles).await.into_iter().enumerate() {
            let result = joined.unwrap_or_else(|e| Err(Error::Worker(format!("worker {id}: {e}"))));
            if let Err(e) = result {
                log::error!("Worker {id} stopped: {e}");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
