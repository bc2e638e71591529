// Language names for audio track titles and the default subtitle request list

use std::collections::HashMap;

/// Subtitle languages requested from yt-dlp unless configured otherwise
pub const DEFAULT_SUBTITLE_LANGUAGES: [&str; 12] = [
    "en", "es", "fr", "de", "it", "pt", "ru", "zh", "ja", "ko", "ar", "hi",
];

const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"), ("es", "Spanish"), ("fr", "French"), ("de", "German"),
    ("it", "Italian"), ("pt", "Portuguese"), ("ru", "Russian"), ("zh", "Chinese"),
    ("ja", "Japanese"), ("ko", "Korean"), ("ar", "Arabic"), ("hi", "Hindi"),
    ("he", "Hebrew"), ("iw", "Hebrew"), ("nl", "Dutch"), ("sv", "Swedish"),
    ("no", "Norwegian"), ("da", "Danish"), ("fi", "Finnish"), ("pl", "Polish"),
    ("cs", "Czech"), ("sk", "Slovak"), ("hu", "Hungarian"), ("ro", "Romanian"),
    ("bg", "Bulgarian"), ("hr", "Croatian"), ("sr", "Serbian"), ("sl", "Slovenian"),
    ("et", "Estonian"), ("lv", "Latvian"), ("lt", "Lithuanian"), ("uk", "Ukrainian"),
    ("be", "Belarusian"), ("mk", "Macedonian"), ("sq", "Albanian"), ("el", "Greek"),
    ("tr", "Turkish"), ("ca", "Catalan"), ("eu", "Basque"), ("gl", "Galician"),
    ("cy", "Welsh"), ("ga", "Irish"), ("is", "Icelandic"), ("mt", "Maltese"),
    ("th", "Thai"), ("vi", "Vietnamese"), ("id", "Indonesian"), ("ms", "Malay"),
    ("tl", "Filipino"), ("sw", "Swahili"), ("am", "Amharic"), ("yo", "Yoruba"),
    ("zu", "Zulu"), ("af", "Afrikaans"), ("fa", "Persian"), ("ur", "Urdu"),
    ("bn", "Bengali"), ("ta", "Tamil"), ("te", "Telugu"), ("kn", "Kannada"),
    ("ml", "Malayalam"), ("mr", "Marathi"), ("gu", "Gujarati"), ("pa", "Punjabi"),
    ("ne", "Nepali"), ("si", "Sinhala"), ("my", "Burmese"), ("km", "Khmer"),
    ("lo", "Lao"), ("ka", "Georgian"), ("hy", "Armenian"), ("az", "Azerbaijani"),
    ("kk", "Kazakh"), ("ky", "Kyrgyz"), ("uz", "Uzbek"), ("tk", "Turkmen"),
    ("mn", "Mongolian"), ("bo", "Tibetan"), ("dz", "Dzongkha"),
];

/// Immutable code → display name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    names: HashMap<String, String>,
}

impl LanguageTable {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    /// Built-in table with `overrides` merged on top
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        for (code, name) in overrides {
            table.names.insert(code.clone(), name.clone());
        }
        table
    }

    /// Display name for `code`, or the code itself when unmapped
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code)
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(
            BUILTIN_LANGUAGES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        )
    }
}
