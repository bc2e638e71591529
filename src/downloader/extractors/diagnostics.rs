// Failure diagnostics - classifies yt-dlp stderr into known causes
//
// The message of a failed invocation is matched case-insensitively against
// phrases yt-dlp prints for the common YouTube refusals. A recognised cause
// is attached to the error so the CLI can print what to try next.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,
    /// Rate limiting (429 or similar)
    RateLimited,
    /// "Sign in to confirm you're not a bot"
    BotDetection,
    /// Age-restricted content requiring login
    AgeRestricted,
    /// Geographic restriction
    GeoBlocked,
    /// Private video requiring authorization
    PrivateVideo,
    /// Video deleted or unavailable
    VideoUnavailable,
    /// Network timeout or unreachable host
    NetworkTimeout,
    /// URL not handled by any yt-dlp extractor
    UnsupportedUrl,
}

impl FailureReason {
    /// Retrying later with the same flags might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden | Self::RateLimited | Self::NetworkTimeout
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::RateLimited => "Rate limited by YouTube",
            Self::BotDetection => "Bot detection triggered",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Not available in your country",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::NetworkTimeout => "Network timeout",
            Self::UnsupportedUrl => "Unsupported URL",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "update yt-dlp or try again later",
            Self::RateLimited => "wait 10-15 minutes before retrying",
            Self::BotDetection => "pass browser cookies to yt-dlp via its config file",
            Self::AgeRestricted => "sign-in cookies are required for this video",
            Self::GeoBlocked => "use a network in a region where the video is available",
            Self::PrivateVideo => "only accounts with access can download it",
            Self::VideoUnavailable => "the video may have been removed or made private",
            Self::NetworkTimeout => "check your connection and try again",
            Self::UnsupportedUrl => "check the URL points at a single YouTube video",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description(), self.hint())
    }
}

/// Match yt-dlp output against known failure causes
pub fn diagnose_error(message: &str) -> Option<FailureReason> {
    let lower = message.to_lowercase();

    // Ordered: more specific phrases before generic ones
    let patterns: &[(&[&str], FailureReason)] = &[
        (
            &["confirm your age", "age-restricted", "age restricted", "inappropriate for some users"],
            FailureReason::AgeRestricted,
        ),
        (
            &["not a bot", "bot detection", "unusual traffic"],
            FailureReason::BotDetection,
        ),
        (
            &["available in your country", "geo restricted", "geo-restricted", "blocked it in your country"],
            FailureReason::GeoBlocked,
        ),
        (&["private video", "video is private"], FailureReason::PrivateVideo),
        (
            &["video unavailable", "has been removed", "no longer available", "account associated with this video has been terminated"],
            FailureReason::VideoUnavailable,
        ),
        (&["unsupported url", "is not a valid url"], FailureReason::UnsupportedUrl),
        (&["http error 429", "too many requests"], FailureReason::RateLimited),
        (&["http error 403", "403: forbidden"], FailureReason::Http403Forbidden),
        (
            &["timed out", "timeout", "network is unreachable", "connection reset", "temporary failure in name resolution"],
            FailureReason::NetworkTimeout,
        ),
    ];

    patterns
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, reason)| *reason)
}
