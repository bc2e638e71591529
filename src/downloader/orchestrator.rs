// Orchestrator: skip check → format listing → selection → download → file cleanup

use std::path::{Path, PathBuf};

use super::config::DownloaderConfig;
use super::errors::Result;
use super::extractors::FormatSource;
use super::format_selector::{quality_order, FormatSelector, QualityOrder};
use super::languages::LanguageTable;
use super::models::{DownloadRequest, RunOutcome};
use super::traits::DownloadBackend;
use super::utils;
use super::video_id::extract_video_id;

pub struct Downloader {
    config: DownloaderConfig,
    languages: LanguageTable,
    source: Box<dyn FormatSource>,
    backend: Box<dyn DownloadBackend>,
    order: Box<dyn QualityOrder>,
}

impl Downloader {
    pub fn new(
        config: DownloaderConfig,
        languages: LanguageTable,
        source: Box<dyn FormatSource>,
        backend: Box<dyn DownloadBackend>,
    ) -> Self {
        let order = quality_order(config.video_ranking);
        Self {
            config,
            languages,
            source,
            backend,
            order,
        }
    }

    /// `<output_root>/<video id>` for `url`
    pub fn video_dir(output_root: &Path, url: &str) -> PathBuf {
        output_root.join(extract_video_id(url))
    }

    /// Download `url` into `<output_root>/<video id>/`, or skip when a
    /// container is already there.
    pub async fn run(&self, url: &str, output_root: &Path) -> Result<RunOutcome> {
        let video_dir = Self::video_dir(output_root, url);
        utils::create_dir_all(&video_dir)?;
        println!("Downloading to: {}", video_dir.display());

        if utils::contains_file_with_extension(&video_dir, &self.config.container_ext)? {
            println!("Video already downloaded in {}", video_dir.display());
            println!("Skipping download. Delete the folder to re-download.");
            return Ok(RunOutcome::Skipped { dir: video_dir });
        }

        let temp_dir = video_dir.join(&self.config.temp_dir_name);
        utils::create_dir_all(&temp_dir)?;

        println!("Fetching formats...");
        tracing::debug!(source = self.source.name(), url, "fetching formats");
        let info = self.source.fetch_formats(url).await?;
        let selection = FormatSelector::select(&info, self.order.as_ref())?;

        println!("Best video format: {}", selection.video.id);
        println!(
            "Found {} unique audio languages",
            selection.audio_tracks.len()
        );
        for line in FormatSelector::describe_tracks(&selection.audio_tracks, &self.languages) {
            println!("{}", line);
        }

        let request = DownloadRequest {
            url: url.to_string(),
            selection,
        };
        println!(
            "Starting download with format: {}",
            request.selection.format_selector()
        );
        tracing::debug!(backend = self.backend.name(), "running download backend");
        self.backend.download(&request, &temp_dir).await?;

        let files = self.collect_outputs(&temp_dir, &video_dir)?;

        println!("Download completed in: {}", video_dir.display());
        Ok(RunOutcome::Downloaded {
            dir: video_dir,
            files,
        })
    }

    /// Move finished containers up, drop the working dir and stray subtitle files
    fn collect_outputs(&self, temp_dir: &Path, video_dir: &Path) -> Result<Vec<PathBuf>> {
        let produced =
            utils::files_with_extensions(temp_dir, &[self.config.container_ext.clone()])?;
        if produced.is_empty() {
            tracing::warn!(dir = %temp_dir.display(), "download produced no container file");
        }

        let mut moved = Vec::with_capacity(produced.len());
        for src in produced {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dest = video_dir.join(name);
            utils::move_file(&src, &dest)?;
            println!("Moved: {}", name.to_string_lossy());
            moved.push(dest);
        }

        utils::remove_files_with_extensions(temp_dir, &self.config.sidecar_extensions)?;
        utils::remove_dir_all(temp_dir)?;

        let removed =
            utils::remove_files_with_extensions(video_dir, &self.config.sidecar_extensions)?;
        if removed > 0 {
            tracing::info!(removed, "removed standalone subtitle files");
        }

        Ok(moved)
    }
}
