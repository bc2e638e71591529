// CLI FormatSource - runs `yt-dlp -F <url>` and scrapes the printed table

use async_trait::async_trait;

use super::diagnostics::diagnose_error;
use super::table::parse_format_table;
use super::traits::FormatSource;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::FormatInfo;
use crate::downloader::utils::{describe_failure, run_output_with_timeout};

/// Format source backed by the yt-dlp binary's `-F` listing
pub struct CliFormatSource {
    ytdlp_path: String,
    timeout_secs: Option<u64>,
}

impl CliFormatSource {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        self.timeout_secs = seconds;
        self
    }

    fn build_args(url: &str) -> Vec<String> {
        vec!["-F".to_string(), url.to_string()]
    }
}

#[async_trait]
impl FormatSource for CliFormatSource {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn fetch_formats(&self, url: &str) -> Result<FormatInfo, DownloadError> {
        let args = Self::build_args(url);
        tracing::info!(
            program = %self.ytdlp_path,
            args = %args.join(" "),
            "listing formats"
        );

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, None, self.timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = %output.status, stderr = %stderr.trim(), "format listing failed");
            return Err(DownloadError::FormatFetch {
                reason: describe_failure(&output.status, &stderr),
                hint: diagnose_error(&stderr),
            });
        }

        parse_format_table(&String::from_utf8_lossy(&output.stdout))
    }
}
