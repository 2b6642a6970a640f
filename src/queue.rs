//! Shared FIFO of dump shards waiting to be downloaded.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single shard to materialize on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Manifest filename, used for display.
    pub name: String,
    /// Path relative to a mirror root, e.g. `/enwiki/20240101/enwiki-...7z`.
    pub remote_path: String,
    /// Where the finished file lands.
    pub local_path: PathBuf,
}

/// A task handed out by [`TaskQueue::claim_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// The claimed task.
    pub task: Task,
    /// 1-based claim number across all workers.
    pub position: usize,
    /// Number of tasks the queue was created with.
    pub total: usize,
}

/// Work queue shared by every worker of a run.
///
/// Claims are serialized by a mutex, so tasks come out exactly once and in
/// the order they were enqueued, whatever the number of concurrent callers.
#[derive(Debug)]
pub struct TaskQueue {
    remaining: Mutex<VecDeque<Task>>,
    total: usize,
}

impl TaskQueue {
    /// Creates a queue holding `tasks` in order.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        let total = tasks.len();
        Self {
            remaining: Mutex::new(tasks.into()),
            total,
        }
    }

    /// Removes and returns the head of the queue, or `None` once drained.
    pub fn claim_next(&self) -> Option<Claim> {
        let mut remaining = self.lock();
        let task = remaining.pop_front()?;
        let position = self.total - remaining.len();
        drop(remaining);
        Some(Claim {
            task,
            position,
            total: self.total,
        })
    }

    /// Number of tasks the queue was created with.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of tasks not yet claimed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    /// Returns true once every task has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Recovers the guard from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
