// yt-dlp download backend: one invocation fetching video, every audio
// language and subtitles, merged into a single container

use async_trait::async_trait;
use std::path::Path;

use crate::downloader::config::DownloaderConfig;
use crate::downloader::errors::DownloadError;
use crate::downloader::extractors::diagnose_error;
use crate::downloader::languages::LanguageTable;
use crate::downloader::models::{AudioFormat, DownloadRequest};
use crate::downloader::traits::DownloadBackend;
use crate::downloader::utils::{describe_failure, parse_ytdlp_progress, run_streaming_with_timeout};

pub struct YtDlpBackend {
    config: DownloaderConfig,
    languages: LanguageTable,
}

impl YtDlpBackend {
    pub fn new(config: DownloaderConfig, languages: LanguageTable) -> Self {
        Self { config, languages }
    }

    /// ffmpeg arguments titling each audio stream with its language name
    pub fn metadata_args(tracks: &[AudioFormat], languages: &LanguageTable) -> Vec<String> {
        tracks
            .iter()
            .enumerate()
            .map(|(i, track)| {
                format!(
                    "-metadata:s:a:{} title=\"{}\"",
                    i,
                    languages.display_name(&track.language)
                )
            })
            .collect()
    }

    pub fn build_args(&self, request: &DownloadRequest) -> Vec<String> {
        let config = &self.config;
        let mut args = vec![
            "--no-warnings".to_string(),
            "-f".to_string(),
            request.selection.format_selector(),
            "--audio-multistreams".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            config.subtitle_languages.join(","),
            "--embed-subs".to_string(),
            "--merge-output-format".to_string(),
            config.container_ext.clone(),
            "--retries".to_string(),
            config.retries.to_string(),
            "--fragment-retries".to_string(),
            config.fragment_retries.to_string(),
            "--retry-sleep".to_string(),
            config.retry_sleep_secs.to_string(),
            "--sleep-subtitles".to_string(),
            config.sleep_subtitles_secs.to_string(),
            // one progress update per line so stdout can be parsed
            "--newline".to_string(),
        ];

        let metadata = Self::metadata_args(&request.selection.audio_tracks, &self.languages);
        if !metadata.is_empty() {
            args.push("--postprocessor-args".to_string());
            args.push(format!("ffmpeg:{}", metadata.join(" ")));
        }

        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl DownloadBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        work_dir: &Path,
    ) -> Result<(), DownloadError> {
        let args = self.build_args(request);
        tracing::info!(
            program = %self.config.ytdlp_path,
            work_dir = %work_dir.display(),
            "starting download"
        );
        tracing::debug!(args = ?args, "yt-dlp arguments");

        let mut last_decile = -1_i32;
        let (status, stderr) = run_streaming_with_timeout(
            &self.config.ytdlp_path,
            &args,
            work_dir,
            self.config.download_timeout_secs,
            |line| match parse_ytdlp_progress(line) {
                Some((percent, status)) => {
                    // --newline prints every update; keep percentages to 10% steps
                    let decile = (percent / 10.0).floor() as i32;
                    let is_percent = status.starts_with(|c: char| c.is_ascii_digit());
                    if !is_percent || decile != last_decile {
                        tracing::info!(percent, "{}", status);
                    }
                    if is_percent {
                        last_decile = decile;
                    }
                }
                None => tracing::debug!("[yt-dlp] {}", line),
            },
        )
        .await?;

        if !status.success() {
            tracing::warn!(status = %status, stderr = %stderr.trim(), "download failed");
            return Err(DownloadError::Download {
                reason: describe_failure(&status, &stderr),
                hint: diagnose_error(&stderr),
            });
        }

        tracing::info!("yt-dlp finished");
        Ok(())
    }
}
