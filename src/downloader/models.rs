// Data models shared by format sources, the selector and download backends

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Language bucket for audio streams that carry no `[xx]` tag
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// One selectable video-only stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFormat {
    /// Format ID (e.g., "137", "248")
    pub id: String,
    /// Raw descriptive line as printed by yt-dlp
    pub quality: String,
}

/// One selectable audio-only stream for a single language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Format ID (e.g., "140", "251-1")
    pub id: String,
    /// Language code, `UNKNOWN_LANGUAGE` when not tagged
    pub language: String,
    /// Raw descriptive line as printed by yt-dlp
    pub quality: String,
}

/// Streams found by one format listing, in the order they were printed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub video_formats: Vec<VideoFormat>,
    pub audio_formats: Vec<AudioFormat>,
}

/// Chosen video stream plus one audio stream per language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub video: VideoFormat,
    pub audio_tracks: Vec<AudioFormat>,
}

impl Selection {
    /// yt-dlp format selector: `video+audio1+audio2...`
    pub fn format_selector(&self) -> String {
        std::iter::once(self.video.id.as_str())
            .chain(self.audio_tracks.iter().map(|a| a.id.as_str()))
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Everything a backend needs to perform the merged download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub selection: Selection,
}

/// Result of one run of the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Container already present, nothing was fetched
    Skipped { dir: PathBuf },
    /// Download finished; `files` are the containers moved into `dir`
    Downloaded { dir: PathBuf, files: Vec<PathBuf> },
}

impl RunOutcome {
    pub fn dir(&self) -> &PathBuf {
        match self {
            Self::Skipped { dir } | Self::Downloaded { dir, .. } => dir,
        }
    }
}
