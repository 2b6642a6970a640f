//! CLI mode for wikidump-dl: download or verify one dump version.

mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Parser;

use crate::{
    AppConfig, ChecksumAlgorithm, CompressType, Coordinator, DownloadProgress, DumpJob,
    HttpTransfer, Manifest, MirrorSelector, TaskRange, Transfer, VersionLayout, build_http_client,
    build_tasks, fetch_manifest, format_bytes, format_elapsed, read_marker, verify, version_tag,
    write_marker,
};

use progress::{CliProgress, print_summary, print_task_list, print_verify_report};

/// Command-line arguments. Unset options fall back to the config file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikidump-dl",
    version,
    about = "Download and verify Wikipedia history dumps"
)]
pub struct Args {
    /// Data directory; each dump version gets a subdirectory
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Proxy URL used for every request
    #[arg(long)]
    pub proxy: Option<String>,

    /// Compressed file type to download
    #[arg(long, value_enum)]
    pub compress_type: Option<CompressType>,

    /// Number of concurrent workers [default: 3]
    #[arg(short = 'n', long)]
    pub threads: Option<usize>,

    /// First file to download (1-based)
    #[arg(long, default_value_t = 1)]
    pub start: usize,

    /// Last file to download (inclusive)
    #[arg(long)]
    pub end: Option<usize>,

    /// Verify the files of this version instead of downloading
    #[arg(long)]
    pub verify: bool,

    /// Digest used by --verify
    #[arg(long, value_enum)]
    pub checksum: Option<ChecksumAlgorithm>,

    /// Wiki database name, e.g. enwiki
    #[arg(long)]
    pub wiki: Option<String>,

    /// Dump version tag (YYYYMMDD) [default: first day of the current month]
    #[arg(long)]
    pub dump_version: Option<String>,

    /// Config file [default: <config dir>/wikidump-dl/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Overrides config values with the flags that were given.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_path {
            config.paths.data_dir.clone_from(dir);
        }
        if let Some(proxy) = &self.proxy {
            config.download.proxy = Some(proxy.clone());
        }
        if let Some(compress) = self.compress_type {
            config.download.compress = compress;
        }
        if let Some(threads) = self.threads {
            config.download.threads = threads;
        }
        if let Some(checksum) = self.checksum {
            config.download.checksum = checksum;
        }
        if let Some(wiki) = &self.wiki {
            config.download.wiki.clone_from(wiki);
        }
    }

    const fn range(&self) -> TaskRange {
        TaskRange::new(self.start, self.end)
    }
}

fn init_logger(args: &Args) {
    use env_logger::Env;
    use log::LevelFilter;

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if args.quiet {
        builder.filter_level(LevelFilter::Error);
    } else if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_secs();
    let _ = builder.try_init();
}

/// Parses the process arguments and runs one download or verify pass.
///
/// # Errors
///
/// Returns an error if the run fails; see [`run_with`].
pub async fn run() -> crate::Result<()> {
    let args = Args::parse();
    init_logger(&args);

    let started = Instant::now();
    let result = run_with(args).await;
    println!("Time elapsed (hh:mm:ss.ms) {}", format_elapsed(started.elapsed()));
    result
}

/// Runs one pass with already-parsed arguments.
///
/// # Errors
///
/// Returns an error if the config is invalid, the manifest cannot be fetched
/// or parsed, or a filesystem operation fails.
pub async fn run_with(args: Args) -> crate::Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let tag = args
        .dump_version
        .clone()
        .unwrap_or_else(|| version_tag(Local::now().date_naive()));
    let layout = VersionLayout::new(&config.paths.data_dir, &config.download.wiki, &tag);
    layout.ensure_dir()?;
    log::info!(
        "start version: {}, data path: {}",
        layout.tag(),
        layout.dir().display()
    );

    if let Some(stamp) = read_marker(&layout.marker_path())? {
        log::info!("download complete as: {stamp}");
        return Ok(());
    }

    let client = build_http_client(&config.download)?;
    let transfer: Arc<dyn Transfer> = Arc::new(HttpTransfer::new(client));

    let manifest_url = layout.manifest_url(&config.mirrors.manifest_host);
    fetch_manifest(transfer.as_ref(), &manifest_url, &layout.manifest_path()).await?;
    let manifest = Manifest::load(&layout.manifest_path())?;
    let job = manifest.job(config.download.compress)?;

    if args.verify {
        run_verify(&config, &layout, &job).await
    } else {
        run_download(&config, &layout, &job, args.range(), transfer, args.verbose).await
    }
}

async fn run_download(
    config: &AppConfig,
    layout: &VersionLayout,
    job: &DumpJob,
    range: TaskRange,
    transfer: Arc<dyn Transfer>,
    verbose: bool,
) -> crate::Result<()> {
    log::info!(
        "{} lists {} file(s), {} in total",
        config.download.compress.job_name(),
        job.files.len(),
        format_bytes(job.total_size())
    );
    let tasks = build_tasks(job, layout.dir(), range);
    print_task_list(&tasks, range.start);

    let mirrors = MirrorSelector::new(config.mirrors.urls.iter().cloned())?;
    let coordinator = Coordinator::new(config.download.threads, mirrors, transfer)?;

    let reporter = Arc::new(CliProgress::new(tasks.len(), !verbose));
    let progress: Arc<dyn DownloadProgress> = Arc::clone(&reporter) as _;
    let result = coordinator.run(tasks, &progress).await;
    reporter.finish();

    print_summary(&reporter.stats());
    result
}

async fn run_verify(config: &AppConfig, layout: &VersionLayout, job: &DumpJob) -> crate::Result<()> {
    let report = verify(job, layout.dir(), config.download.checksum).await?;
    print_verify_report(&report);

    if report.is_success() {
        write_marker(&layout.marker_path(), &Local::now())?;
        log::info!("All files verified, wrote {}", layout.marker_path().display());
    } else {
        log::warn!("Verification incomplete; run the download again to fetch missing files");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_untouched() {
        let args = Args::try_parse_from(["wikidump-dl"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.download.threads, 3);
        assert_eq!(config.download.compress, CompressType::SevenZip);
        assert_eq!(config.paths.data_dir, PathBuf::from("./data"));
        assert_eq!(args.range(), TaskRange::new(1, None));
        assert!(!args.verify);
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "wikidump-dl",
            "--data-path",
            "/srv/dumps",
            "--proxy",
            "http://proxy:3128",
            "--compress-type",
            "bz2",
            "--threads",
            "6",
            "--start",
            "2",
            "--end",
            "4",
            "--checksum",
            "sha1",
            "--wiki",
            "frwiki",
            "--verify",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.paths.data_dir, PathBuf::from("/srv/dumps"));
        assert_eq!(config.download.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(config.download.compress, CompressType::Bz2);
        assert_eq!(config.download.threads, 6);
        assert_eq!(config.download.checksum, ChecksumAlgorithm::Sha1);
        assert_eq!(config.download.wiki, "frwiki");
        assert_eq!(args.range(), TaskRange::new(2, Some(4)));
        assert!(args.verify);
    }

    #[test]
    fn unknown_compress_type_rejected() {
        assert!(Args::try_parse_from(["wikidump-dl", "--compress-type", "gz"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["wikidump-dl", "-v", "-q"]).is_err());
    }
}
