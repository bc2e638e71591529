use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = youtube_multitrack_lib::cli::Args::parse();
    youtube_multitrack_lib::run(args).await
}
