// Download backend trait definition

use async_trait::async_trait;
use std::path::Path;

use super::errors::DownloadError;
use super::models::DownloadRequest;

/// Performs the merged download of a selection into a working directory
#[async_trait]
pub trait DownloadBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Download and mux `request` with `work_dir` as the current directory.
    /// Returns only after the external work has finished.
    async fn download(&self, request: &DownloadRequest, work_dir: &Path)
        -> Result<(), DownloadError>;
}
