// Download backends
pub mod ytdlp;

pub use ytdlp::YtDlpBackend;
