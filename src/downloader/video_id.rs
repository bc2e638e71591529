// Output directory name derived from a video URL

use regex::Regex;
use time::OffsetDateTime;

lazy_static::lazy_static! {
    static ref QUERY_ID_RE: Regex = Regex::new(r"[?&]v=([^&]*)").unwrap();
    static ref SHORT_LINK_RE: Regex = Regex::new(r"youtu\.be/([^?]*)").unwrap();
}

/// Extract the id used as the per-video output directory.
///
/// Tries the `v` query parameter, then the `youtu.be/<id>` short link form,
/// and finally falls back to the current Unix timestamp in seconds.
///
/// An empty match (`?v=&t=1`, a bare `youtu.be/`) counts as no match and moves
/// on to the next rule. Returning the empty string instead would put the video
/// directly in the output root, where the skip check sees every other video.
pub fn extract_video_id(url: &str) -> String {
    for re in [&*QUERY_ID_RE, &*SHORT_LINK_RE] {
        if let Some(id) = re
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
        {
            return id.to_string();
        }
    }

    let fallback = OffsetDateTime::now_utc().unix_timestamp().to_string();
    tracing::debug!(url, fallback = %fallback, "no video id in url, using timestamp");
    fallback
}
