// Error types for the download pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::extractors::FailureReason;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// No video URL was given on the command line
    #[error("missing argument: a video URL is required")]
    MissingArgument,

    /// yt-dlp could not list the available formats
    #[error("failed to fetch video formats: {reason}")]
    FormatFetch {
        reason: String,
        hint: Option<FailureReason>,
    },

    /// Format listing text could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// Listing had no usable video-only or audio-only stream
    #[error("could not detect video or audio formats: {0}")]
    NoSuitableFormat(String),

    /// yt-dlp failed while downloading or merging
    #[error("download failed: {reason}")]
    Download {
        reason: String,
        hint: Option<FailureReason>,
    },

    /// Directory or file operation failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// yt-dlp binary could not be started
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// External process exceeded its deadline
    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl DownloadError {
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Diagnosed cause of an external tool failure, if one was recognised
    pub fn hint(&self) -> Option<FailureReason> {
        match self {
            Self::FormatFetch { hint, .. } | Self::Download { hint, .. } => *hint,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
