// Downloader configuration: defaults, JSON file and builder overrides

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::errors::{DownloadError, Result};
use super::languages::{LanguageTable, DEFAULT_SUBTITLE_LANGUAGES};

/// Directory under the user config dir that holds `config.json`
pub const CONFIG_DIR_NAME: &str = "youtube-multitrack";

/// Strategy used to pick the best video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoRanking {
    /// Last listed stream wins (yt-dlp lists ascending quality)
    #[default]
    Emission,
    /// Highest parsed resolution wins, listing order breaks ties
    Resolution,
}

impl FromStr for VideoRanking {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emission" => Ok(Self::Emission),
            "resolution" => Ok(Self::Resolution),
            other => Err(format!("unknown video ranking '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// yt-dlp executable, resolved through PATH when not absolute
    pub ytdlp_path: String,
    /// Merge output container, also the extension looked for by the skip check
    pub container_ext: String,
    /// Working directory name inside the per-video directory
    pub temp_dir_name: String,
    pub retries: u32,
    pub fragment_retries: u32,
    pub retry_sleep_secs: u32,
    pub sleep_subtitles_secs: u32,
    /// Deadline for the format listing call, none means wait forever
    pub list_timeout_secs: Option<u64>,
    /// Deadline for the download call, none means wait forever
    pub download_timeout_secs: Option<u64>,
    /// Standalone subtitle files removed after embedding
    pub sidecar_extensions: Vec<String>,
    pub subtitle_languages: Vec<String>,
    /// Extra or replacement code → name entries for audio track titles
    pub languages: HashMap<String, String>,
    pub video_ranking: VideoRanking,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            container_ext: "mkv".to_string(),
            temp_dir_name: "temp".to_string(),
            retries: 5,
            fragment_retries: 5,
            retry_sleep_secs: 10,
            sleep_subtitles_secs: 5,
            list_timeout_secs: None,
            download_timeout_secs: None,
            sidecar_extensions: vec!["vtt".to_string(), "srt".to_string()],
            subtitle_languages: DEFAULT_SUBTITLE_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            languages: HashMap::new(),
            video_ranking: VideoRanking::Emission,
        }
    }
}

impl DownloaderConfig {
    /// Read a JSON config file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DownloadError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DownloadError::Config(format!("invalid JSON in {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/youtube-multitrack/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.json"))
    }

    /// Explicit file if given, else the default file if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading default config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ytdlp_path.trim().is_empty() {
            return Err(DownloadError::Config("ytdlp_path is empty".to_string()));
        }
        if self.container_ext.trim().is_empty() {
            return Err(DownloadError::Config("container_ext is empty".to_string()));
        }
        let temp = Path::new(&self.temp_dir_name);
        if self.temp_dir_name.is_empty() || temp.components().count() != 1 || temp.is_absolute()
        {
            return Err(DownloadError::Config(format!(
                "temp_dir_name must be a single directory name, got '{}'",
                self.temp_dir_name
            )));
        }
        Ok(())
    }

    /// Language lookup with configured entries merged over the built-in table
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::with_overrides(&self.languages)
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        if let Some(path) = path {
            self.ytdlp_path = path;
        }
        self
    }

    pub fn with_list_timeout(mut self, seconds: Option<u64>) -> Self {
        if seconds.is_some() {
            self.list_timeout_secs = seconds;
        }
        self
    }

    pub fn with_download_timeout(mut self, seconds: Option<u64>) -> Self {
        if seconds.is_some() {
            self.download_timeout_secs = seconds;
        }
        self
    }

    pub fn with_video_ranking(mut self, ranking: Option<VideoRanking>) -> Self {
        if let Some(ranking) = ranking {
            self.video_ranking = ranking;
        }
        self
    }

    /// Anchor a relative path such as `./bin/yt-dlp` to the current directory.
    /// The download runs inside the temp dir, where it would no longer resolve.
    /// Bare program names are left for the search path.
    pub fn resolve_ytdlp_path(mut self) -> Result<Self> {
        let path = Path::new(&self.ytdlp_path);
        if path.is_absolute() || path.components().count() < 2 {
            return Ok(self);
        }
        let cwd = std::env::current_dir().map_err(|e| {
            DownloadError::Config(format!("cannot resolve {}: {}", self.ytdlp_path, e))
        })?;
        let resolved = cwd.join(path).to_string_lossy().into_owned();
        tracing::debug!(path = %resolved, "resolved relative yt-dlp path");
        self.ytdlp_path = resolved;
        Ok(self)
    }
}
