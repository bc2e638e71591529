// FormatSource trait - where the list of selectable streams comes from

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::FormatInfo;

/// Source of the video-only and audio-only streams available for a URL.
///
/// Implementations must not return until the underlying listing has fully
/// completed, and must fail rather than guess when the listing fails.
#[async_trait]
pub trait FormatSource: Send + Sync {
    /// Name of the source (for logging)
    fn name(&self) -> &'static str;

    /// List the streams available for `url`
    async fn fetch_formats(&self, url: &str) -> Result<FormatInfo, DownloadError>;
}
