use clap::Parser;
use std::path::PathBuf;

use crate::downloader::VideoRanking;

/// Download a YouTube video with every audio language and embedded subtitles.
///
/// The best video-only stream and one audio stream per language are merged by
/// yt-dlp into a single mkv under OUTPUT_DIR/<video id>/.
#[derive(Debug, Clone, Parser)]
#[command(name = "youtube-multitrack", version, about)]
pub struct Args {
    /// YouTube URL to download
    pub url: Option<String>,

    /// Directory to save files
    #[arg(default_value = "downloads")]
    pub output_dir: PathBuf,

    /// JSON config file (default: <config dir>/youtube-multitrack/config.json if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// yt-dlp executable to run
    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub ytdlp: Option<String>,

    /// Give up on the format listing after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub list_timeout: Option<u64>,

    /// Give up on the download after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub download_timeout: Option<u64>,

    /// How to pick the best video stream: emission (last listed) or resolution
    #[arg(long, value_name = "RANKING")]
    pub ranking: Option<VideoRanking>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn usage() -> String {
    [
        "Usage: youtube-multitrack <video-url> [output-directory]",
        "  video-url: YouTube URL to download",
        "  output-directory: Directory to save files (default: downloads)",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_and_default_output_dir() {
        let args = Args::parse_from(["youtube-multitrack", "https://youtu.be/xyz789"]);
        assert_eq!(args.url.as_deref(), Some("https://youtu.be/xyz789"));
        assert_eq!(args.output_dir, PathBuf::from("downloads"));
        assert!(args.ranking.is_none());
    }

    #[test]
    fn url_is_optional_at_parse_time() {
        let args = Args::parse_from(["youtube-multitrack"]);
        assert!(args.url.is_none());
    }

    #[test]
    fn options_parse() {
        let args = Args::parse_from([
            "youtube-multitrack",
            "--yt-dlp",
            "/opt/yt-dlp",
            "--list-timeout",
            "30",
            "--ranking",
            "resolution",
            "-v",
            "https://youtube.com/watch?v=abc123",
            "/tmp/out",
        ]);
        assert_eq!(args.ytdlp.as_deref(), Some("/opt/yt-dlp"));
        assert_eq!(args.list_timeout, Some(30));
        assert_eq!(args.ranking, Some(VideoRanking::Resolution));
        assert!(args.verbose);
        assert_eq!(args.output_dir, PathBuf::from("/tmp/out"));
    }
}
