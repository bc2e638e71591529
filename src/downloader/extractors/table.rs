// Parser for the human-readable `yt-dlp -F` format table
//
// The table is not a stable schema. Only two informal markers are relied on:
// rows containing "video only" / "audio only" describe selectable streams,
// and audio rows may carry a bracketed language tag such as `[en]`. Anything
// else (headers, separators, storyboards, muxed formats) is skipped.

use regex::Regex;

use crate::downloader::errors::{DownloadError, Result};
use crate::downloader::models::{AudioFormat, FormatInfo, VideoFormat, UNKNOWN_LANGUAGE};

const VIDEO_ONLY_MARKER: &str = "video only";
const AUDIO_ONLY_MARKER: &str = "audio only";

lazy_static::lazy_static! {
    static ref LANGUAGE_TAG_RE: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// Classify every line of a format listing into video-only and audio-only streams.
///
/// Fails with `Parse` only when the listing is blank; a listing without any
/// stream rows yields an empty `FormatInfo` and is left to the selector.
pub fn parse_format_table(output: &str) -> Result<FormatInfo> {
    if output.trim().is_empty() {
        return Err(DownloadError::Parse(
            "format listing is empty".to_string(),
        ));
    }

    let mut info = FormatInfo::default();

    for line in output.lines() {
        if line.contains(VIDEO_ONLY_MARKER) {
            if let Some(id) = first_token(line) {
                info.video_formats.push(VideoFormat {
                    id: id.to_string(),
                    quality: line.to_string(),
                });
            }
        } else if line.contains(AUDIO_ONLY_MARKER) {
            if let Some(id) = first_token(line) {
                info.audio_formats.push(AudioFormat {
                    id: id.to_string(),
                    language: language_tag(line).unwrap_or(UNKNOWN_LANGUAGE).to_string(),
                    quality: line.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        video = info.video_formats.len(),
        audio = info.audio_formats.len(),
        "parsed format table"
    );

    Ok(info)
}

fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Contents of the first `[...]` group on the line
fn language_tag(line: &str) -> Option<&str> {
    LANGUAGE_TAG_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
