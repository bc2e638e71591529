// Format sources - where the selectable streams for a URL come from
//
// - `FormatSource` trait: one call returning `FormatInfo`
// - CLI source: runs `yt-dlp -F` and scrapes the human-readable table
// - Table parser: pure text classification, reusable by any text-based source
// - Diagnostics: maps yt-dlp failure output to a known cause

mod cli;
mod diagnostics;
mod table;
mod traits;

pub use cli::CliFormatSource;
pub use diagnostics::{diagnose_error, FailureReason};
pub use table::parse_format_table;
pub use traits::FormatSource;
