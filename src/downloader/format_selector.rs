// FormatSelector - picks the video stream and one audio stream per language
//
// Video quality is decided by a pluggable `QualityOrder`:
// - EmissionOrder: last listed wins (yt-dlp prints ascending quality)
// - ResolutionOrder: highest WxH / Np from the descriptor, listing order breaks ties
//
// Audio tracks are deduplicated by language code, first listed wins.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::config::VideoRanking;
use super::errors::{DownloadError, Result};
use super::languages::LanguageTable;
use super::models::{AudioFormat, FormatInfo, Selection, VideoFormat};

/// A video format together with its position in the listing
pub type Ranked<'a> = (usize, &'a VideoFormat);

/// Total order over video formats; the greatest one is downloaded
pub trait QualityOrder: Send + Sync {
    fn name(&self) -> &'static str;

    fn compare(&self, a: Ranked<'_>, b: Ranked<'_>) -> Ordering;
}

/// Later in the listing means better
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionOrder;

impl QualityOrder for EmissionOrder {
    fn name(&self) -> &'static str {
        "emission"
    }

    fn compare(&self, a: Ranked<'_>, b: Ranked<'_>) -> Ordering {
        a.0.cmp(&b.0)
    }
}

/// Taller picture means better; rows without a resolution rank lowest
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionOrder;

impl ResolutionOrder {
    fn height(format: &VideoFormat) -> Option<u32> {
        lazy_static::lazy_static! {
            static ref DIMENSIONS_RE: Regex = Regex::new(r"\b(\d{2,5})x(\d{2,5})\b").unwrap();
            static ref HEIGHT_RE: Regex = Regex::new(r"\b(\d{3,4})p\d*\b").unwrap();
        }

        DIMENSIONS_RE
            .captures(&format.quality)
            .and_then(|caps| caps.get(2))
            .or_else(|| HEIGHT_RE.captures(&format.quality).and_then(|caps| caps.get(1)))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl QualityOrder for ResolutionOrder {
    fn name(&self) -> &'static str {
        "resolution"
    }

    fn compare(&self, a: Ranked<'_>, b: Ranked<'_>) -> Ordering {
        Self::height(a.1)
            .cmp(&Self::height(b.1))
            .then_with(|| a.0.cmp(&b.0))
    }
}

/// Order implementation for a configured ranking
pub fn quality_order(ranking: VideoRanking) -> Box<dyn QualityOrder> {
    match ranking {
        VideoRanking::Emission => Box::new(EmissionOrder),
        VideoRanking::Resolution => Box::new(ResolutionOrder),
    }
}

pub struct FormatSelector;

impl FormatSelector {
    /// Greatest format under `order`, `None` for an empty list
    pub fn best_video<'a>(
        formats: &'a [VideoFormat],
        order: &dyn QualityOrder,
    ) -> Option<&'a VideoFormat> {
        formats
            .iter()
            .enumerate()
            .max_by(|a, b| order.compare(*a, *b))
            .map(|(_, format)| format)
    }

    /// First stream of each language, in listing order
    pub fn unique_audio_tracks(formats: &[AudioFormat]) -> Vec<AudioFormat> {
        let mut seen = HashSet::new();
        formats
            .iter()
            .filter(|f| seen.insert(f.language.as_str()))
            .cloned()
            .collect()
    }

    pub fn select(info: &FormatInfo, order: &dyn QualityOrder) -> Result<Selection> {
        let video = Self::best_video(&info.video_formats, order).ok_or_else(|| {
            DownloadError::NoSuitableFormat("no video-only format found".to_string())
        })?;
        let audio_tracks = Self::unique_audio_tracks(&info.audio_formats);
        if audio_tracks.is_empty() {
            return Err(DownloadError::NoSuitableFormat(
                "no audio-only format found".to_string(),
            ));
        }

        tracing::debug!(
            order = order.name(),
            video = %video.id,
            audio = audio_tracks.len(),
            "selected formats"
        );

        Ok(Selection {
            video: video.clone(),
            audio_tracks,
        })
    }

    /// One line per track: `  en (English): 251-0`
    pub fn describe_tracks(tracks: &[AudioFormat], languages: &LanguageTable) -> Vec<String> {
        tracks
            .iter()
            .map(|t| {
                format!(
                    "  {} ({}): {}",
                    t.language,
                    languages.display_name(&t.language),
                    t.id
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, quality: &str) -> VideoFormat {
        VideoFormat {
            id: id.to_string(),
            quality: quality.to_string(),
        }
    }

    fn audio(id: &str, language: &str) -> AudioFormat {
        AudioFormat {
            id: id.to_string(),
            language: language.to_string(),
            quality: String::new(),
        }
    }

    #[test]
    fn emission_order_picks_last() {
        let formats = vec![video("f1", ""), video("f2", ""), video("f3", "")];
        let best = FormatSelector::best_video(&formats, &EmissionOrder).unwrap();
        assert_eq!(best.id, "f3");
    }

    #[test]
    fn empty_video_list_has_no_best() {
        assert!(FormatSelector::best_video(&[], &EmissionOrder).is_none());
    }

    #[test]
    fn resolution_order_picks_tallest() {
        let formats = vec![
            video("137", "137 mp4 1920x1080 25 | avc1 video only 1080p"),
            video("160", "160 mp4 256x144 25 | avc1 video only 144p"),
            video("398", "398 mp4 1280x720 25 | av01 video only 720p"),
        ];
        let best = FormatSelector::best_video(&formats, &ResolutionOrder).unwrap();
        assert_eq!(best.id, "137");
    }

    #[test]
    fn resolution_ties_fall_back_to_listing_order() {
        let formats = vec![
            video("137", "137 mp4 1920x1080 video only"),
            video("248", "248 webm 1920x1080 video only"),
            video("x", "x webm video only"),
        ];
        let best = FormatSelector::best_video(&formats, &ResolutionOrder).unwrap();
        assert_eq!(best.id, "248");
    }

    #[test]
    fn resolution_reads_height_suffix() {
        assert_eq!(ResolutionOrder::height(&video("a", "a mp4 video only 720p60")), Some(720));
        assert_eq!(ResolutionOrder::height(&video("a", "a mp4 video only")), None);
    }

    #[test]
    fn dedup_keeps_first_per_language() {
        let formats = vec![audio("a1", "en"), audio("a2", "en"), audio("a3", "fr")];
        let unique = FormatSelector::unique_audio_tracks(&formats);
        let ids: Vec<(&str, &str)> = unique
            .iter()
            .map(|a| (a.id.as_str(), a.language.as_str()))
            .collect();
        assert_eq!(ids, vec![("a1", "en"), ("a3", "fr")]);
    }

    #[test]
    fn unknown_is_its_own_bucket() {
        let formats = vec![audio("a1", "unknown"), audio("a2", "en"), audio("a3", "unknown")];
        let unique = FormatSelector::unique_audio_tracks(&formats);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].id, "a1");
    }

    #[test]
    fn select_requires_video() {
        let info = FormatInfo {
            video_formats: vec![],
            audio_formats: vec![audio("a1", "en")],
        };
        let err = FormatSelector::select(&info, &EmissionOrder).unwrap_err();
        assert!(matches!(err, DownloadError::NoSuitableFormat(_)));
    }

    #[test]
    fn select_requires_audio() {
        let info = FormatInfo {
            video_formats: vec![video("v", "")],
            audio_formats: vec![],
        };
        let err = FormatSelector::select(&info, &EmissionOrder).unwrap_err();
        assert!(matches!(err, DownloadError::NoSuitableFormat(_)));
    }

    #[test]
    fn select_combines_best_video_and_unique_audio() {
        let info = FormatInfo {
            video_formats: vec![video("v1", ""), video("v2", "")],
            audio_formats: vec![audio("a1", "en"), audio("a2", "es"), audio("a3", "en")],
        };
        let selection = FormatSelector::select(&info, &EmissionOrder).unwrap();
        assert_eq!(selection.video.id, "v2");
        assert_eq!(selection.format_selector(), "v2+a1+a2");
    }

    #[test]
    fn describes_tracks_with_names() {
        let lines = FormatSelector::describe_tracks(
            &[audio("251-0", "en"), audio("251-9", "xx")],
            &LanguageTable::default(),
        );
        assert_eq!(lines, vec!["  en (English): 251-0", "  xx (xx): 251-9"]);
    }

    #[test]
    fn quality_order_follows_config() {
        assert_eq!(quality_order(VideoRanking::Emission).name(), "emission");
        assert_eq!(quality_order(VideoRanking::Resolution).name(), "resolution");
    }
}
