//! A single member of the download pool.

use std::sync::Arc;

use crate::download::DownloadProgress;
use crate::error::Result;
use crate::format::format_bytes;
use crate::fs::FileSystem;
use crate::mirror::MirrorSelector;
use crate::queue::{Claim, TaskQueue};
use crate::transfer::{RetryPolicy, Transfer};

/// State shared read-only by every worker of a run.
pub struct WorkerContext {
    pub queue: TaskQueue,
    pub mirrors: Arc<MirrorSelector>,
    pub transfer: Arc<dyn Transfer>,
    pub fs: Arc<dyn FileSystem>,
    pub retry: Arc<dyn RetryPolicy>,
    pub progress: Arc<dyn DownloadProgress>,
}

/// Drains the shared queue one task at a time.
pub struct Worker {
    id: usize,
    ctx: Arc<WorkerContext>,
}

impl Worker {
    #[must_use]
    pub const fn new(id: usize, ctx: Arc<WorkerContext>) -> Self {
        Self { id, ctx }
    }

    /// Claims and materializes tasks until the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error (local I/O failure); transfer
    /// failures are retried according to the retry policy instead.
    pub async fn run(self) -> Result<()> {
        let id = self.id;
        log::debug!("[worker {id}] starting");

        while let Some(claim) = self.ctx.queue.claim_next() {
            log::debug!(
                "[worker {id}] assigned task ({}/{}): {}",
                claim.position,
                claim.total,
                claim.task.remote_path
            );
            self.ctx.progress.on_task_start(id, &claim);

            if self.ctx.fs.file_exists(&claim.task.local_path).await {
                log::info!("[worker {id}] file exists, skip: {}", claim.task.name);
                self.ctx.progress.on_skip(id, &claim);
                continue;
            }

            self.materialize(&claim).await?;
        }

        log::debug!("[worker {id}] exiting");
        Ok(())
    }

    async fn materialize(&self, claim: &Claim) -> Result<()> {
        let id = self.id;
        let task = &claim.task;
        let mut failures = 0u64;

        loop {
            let url = self.ctx.mirrors.resolve(&task.remote_path);
            log::debug!("[worker {id}] start get file: {url}");

            let err = match self.ctx.transfer.fetch(&url, &task.local_path).await {
                Ok(bytes) => {
                    log::info!(
                        "[worker {id}] file downloaded: {} ({})",
                        task.name,
                        format_bytes(bytes)
                    );
                    self.ctx.progress.on_complete(id, claim, bytes);
                    return Ok(());
                }
                Err(e) if e.is_transient() => e,
                Err(e) => {
                    log::error!("[worker {id}] cannot write {}: {e}", task.local_path.display());
                    return Err(e);
                }
            };

            failures += 1;
            log::warn!("[worker {id}] download failed, retry ({failures}): {err}");
            self.ctx.progress.on_retry(id, claim, &err, failures);

            match self.ctx.retry.next_delay(failures) {
                Some(delay) if delay.is_zero() => tokio::task::yield_now().await,
                Some(delay) => tokio::time::sleep(delay).await,
                None => {
                    log::error!(
                        "[worker {id}] giving up on {} after {failures} attempts: {err}",
                        task.name
                    );
                    self.ctx.progress.on_give_up(id, claim, &err);
                    return Ok(());
                }
            }
        }
    }
}
