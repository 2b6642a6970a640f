//! Progress bar and summary reporting for CLI runs.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::{
    Claim, DownloadProgress, Error, SessionStats, SessionStatsTracker, Task, VerifyReport,
    format_bytes, format_duration,
};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates the bar tracking finished shards out of the queue total.
pub fn make_total_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.green/white}] {pos}/{len} shards ({elapsed}) {wide_msg}",
        )
        .expect("template valid")
        .progress_chars("━━╌"),
    );
    bar
}

/// Worker event sink for the terminal: one overall bar plus session counters.
pub struct CliProgress {
    bar: ProgressBar,
    stats: SessionStatsTracker,
}

impl CliProgress {
    /// Creates the reporter; `visible = false` keeps the bar off the terminal.
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = make_total_progress_bar(total);
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            bar,
            stats: SessionStatsTracker::new(),
        }
    }

    fn sync_position(&self) {
        self.bar.set_position(self.stats.finished() as u64);
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Current session counters.
    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }
}

impl DownloadProgress for CliProgress {
    fn on_task_start(&self, _worker: usize, claim: &Claim) {
        self.bar.set_message(claim.task.name.clone());
    }

    fn on_skip(&self, worker: usize, claim: &Claim) {
        self.stats.on_skip(worker, claim);
        self.sync_position();
    }

    fn on_retry(&self, worker: usize, claim: &Claim, error: &Error, failures: u64) {
        self.stats.on_retry(worker, claim, error, failures);
        self.bar
            .set_message(format!("{} (retry {failures})", claim.task.name));
    }

    fn on_complete(&self, worker: usize, claim: &Claim, bytes: u64) {
        self.stats.on_complete(worker, claim, bytes);
        self.sync_position();
    }

    fn on_give_up(&self, worker: usize, claim: &Claim, error: &Error) {
        self.stats.on_give_up(worker, claim, error);
        self.sync_position();
    }
}

/// Prints the numbered list of shards about to be queued.
pub fn print_task_list(tasks: &[Task], first_index: usize) {
    println!("All files to download ...");
    for (i, task) in tasks.iter().enumerate() {
        println!("{} {}", i + first_index.max(1), task.name);
    }
    println!("Total file {} to be downloaded ...", tasks.len());
}

/// Prints a summary of download statistics.
pub fn print_summary(stats: &SessionStats) {
    println!("\n{SEPARATOR}");
    println!("Download Summary");
    println!("{SEPARATOR}");

    println!("  Files downloaded:  {}", stats.files_downloaded);
    if stats.files_downloaded > 0 {
        println!("  Total size:        {}", format_bytes(stats.total_bytes));
        println!("  Total time:        {}", format_duration(stats.elapsed));
        println!(
            "  Average speed:     {}/s",
            format_bytes(stats.average_speed())
        );
    }
    if stats.files_skipped > 0 {
        println!("  Files skipped:     {}", stats.files_skipped);
    }
    if stats.retries > 0 {
        println!("  Failed attempts:   {}", stats.retries);
    }
    if stats.files_failed > 0 {
        println!("  Files abandoned:   {}", stats.files_failed);
    }

    println!("{SEPARATOR}");
}

/// Prints the verification counts and the offending filenames.
pub fn print_verify_report(report: &VerifyReport) {
    println!(
        "{} files passed, {} files missed, {} files crashed.",
        report.passed.len(),
        report.missing.len(),
        report.crashed.len()
    );

    if !report.missing.is_empty() {
        println!("==== Missed Files ====");
        for name in &report.missing {
            println!("  {name}");
        }
    }

    if !report.crashed.is_empty() {
        println!("==== Crashed Files ====");
        for name in &report.crashed {
            println!("  {name}");
        }
    }
}
