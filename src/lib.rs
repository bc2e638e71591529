pub mod cli;
pub mod downloader;

use std::process::ExitCode;

use cli::Args;
use downloader::{
    CliFormatSource, DownloadError, Downloader, DownloaderConfig, RunOutcome, YtDlpBackend,
};

/// Default tracing filter when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "youtube_multitrack_lib=info,youtube_multitrack=info";

pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(
            "youtube_multitrack_lib=debug,youtube_multitrack=debug",
        )
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Merge file config with command line overrides
pub fn build_config(args: &Args) -> downloader::Result<DownloaderConfig> {
    let config = DownloaderConfig::load(args.config.as_deref())?
        .with_ytdlp_path(args.ytdlp.clone())
        .with_list_timeout(args.list_timeout)
        .with_download_timeout(args.download_timeout)
        .with_video_ranking(args.ranking)
        .resolve_ytdlp_path()?;
    config.validate()?;
    Ok(config)
}

pub async fn download(args: Args) -> downloader::Result<RunOutcome> {
    let url = args
        .url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or(DownloadError::MissingArgument)?;
    let config = build_config(&args)?;
    let languages = config.language_table();

    let source = CliFormatSource::new(config.ytdlp_path.clone())
        .with_timeout(config.list_timeout_secs);
    let backend = YtDlpBackend::new(config.clone(), languages.clone());
    let downloader = Downloader::new(config, languages, Box::new(source), Box::new(backend));

    downloader.run(&url, &args.output_dir).await
}

/// Entry point used by the binary: runs one download and maps the outcome to an exit code
pub async fn run(args: Args) -> ExitCode {
    init_tracing(args.verbose);

    match download(args).await {
        Ok(outcome) => {
            tracing::debug!(dir = %outcome.dir().display(), "run finished");
            ExitCode::SUCCESS
        }
        Err(DownloadError::MissingArgument) => {
            eprintln!("{}", cli::usage());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(reason) = e.hint() {
                eprintln!("  {}", reason);
                if reason.is_transient() {
                    eprintln!("  This is usually temporary; running again later may succeed.");
                }
            }
            ExitCode::FAILURE
        }
    }
}
