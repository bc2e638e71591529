// Downloader module - multi-language yt-dlp orchestration

pub mod backends;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod languages;
pub mod models;
pub mod orchestrator;
pub mod traits;
pub mod utils;
pub mod video_id;

pub use backends::YtDlpBackend;
pub use config::{DownloaderConfig, VideoRanking};
pub use errors::{DownloadError, Result};
pub use extractors::{CliFormatSource, FailureReason, FormatSource};
pub use format_selector::{EmissionOrder, FormatSelector, QualityOrder, ResolutionOrder};
pub use languages::LanguageTable;
pub use models::{AudioFormat, DownloadRequest, FormatInfo, RunOutcome, Selection, VideoFormat};
pub use orchestrator::Downloader;
pub use traits::DownloadBackend;
pub use video_id::extract_video_id;
