//! Runs the real yt-dlp source and backend against shell scripts standing in for yt-dlp.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use youtube_multitrack_lib::downloader::{
    CliFormatSource, DownloadError, Downloader, DownloaderConfig, FailureReason, FormatSource,
    RunOutcome, YtDlpBackend,
};

// Writing then exec'ing a script races with forks from parallel tests (ETXTBSY)
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

const LISTING: &str = r#"[info] Available formats for abc123:
ID      EXT   RESOLUTION FPS CH |   FILESIZE   TBR PROTO | VCODEC        VBR ACODEC      ABR ASR MORE INFO
-------------------------------------------------------------------------------------------------------------
140-0   m4a   audio only      2 |    3.21MiB  129k https | audio only        mp4a.40.2  129k 44k [en] English original (default)
140-1   m4a   audio only      2 |    3.20MiB  129k https | audio only        mp4a.40.2  129k 44k [de] German
160     mp4   256x144     25    |    1.05MiB   43k https | avc1.4d400c   43k video only          144p
137     mp4   1920x1080   25    |   60.26MiB 2488k https | avc1.640028 2488k video only          1080p
"#;

fn lock_scripts() -> std::sync::MutexGuard<'static, ()> {
    SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-yt-dlp");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn listing_script(dir: &Path) -> PathBuf {
    let log = dir.join("args.log");
    write_script(
        dir,
        &format!(
            r#"echo "$@" >> "{log}"
if [ "$1" = "-F" ]; then
cat <<'LISTING'
{listing}LISTING
exit 0
fi
echo "[download] Destination: Clip [abc123].f137.mp4"
echo "[download]  42.0% of 60.26MiB at 1.00MiB/s ETA 00:30"
echo "[Merger] Merging formats into \"Clip [abc123].mkv\""
printf 'mkv' > "Clip [abc123].mkv"
printf 'vtt' > "Clip [abc123].en.vtt"
exit 0"#,
            log = log.display(),
            listing = LISTING
        ),
    )
}

fn listing_then(dir: &Path, download_body: &str) -> PathBuf {
    write_script(
        dir,
        &format!(
            r#"if [ "$1" = "-F" ]; then
cat <<'LISTING'
{listing}LISTING
exit 0
fi
{download_body}"#,
            listing = LISTING,
            download_body = download_body
        ),
    )
}

fn downloader_for(script: &Path) -> Downloader {
    downloader_with(DownloaderConfig::default(), script)
}

fn downloader_with(config: DownloaderConfig, script: &Path) -> Downloader {
    let config = config.with_ytdlp_path(Some(script.display().to_string()));
    let languages = config.language_table();
    Downloader::new(
        config.clone(),
        languages.clone(),
        Box::new(CliFormatSource::new(config.ytdlp_path.clone())),
        Box::new(YtDlpBackend::new(config, languages)),
    )
}

#[tokio::test]
async fn cli_source_parses_listing() {
    let _guard = lock_scripts();
    let dir = TempDir::new().unwrap();
    let script = listing_script(dir.path());

    let info = CliFormatSource::new(script.display().to_string())
        .fetch_formats("https://youtu.be/abc123")
        .await
        .unwrap();

    let video: Vec<&str> = info.video_formats.iter().map(|v| v.id.as_str()).collect();
    let audio: Vec<&str> = info.audio_formats.iter().map(|a| a.language.as_str()).collect();
    assert_eq!(video, vec!["160", "137"]);
    assert_eq!(audio, vec!["en", "de"]);

    let log = fs::read_to_string(dir.path().join("args.log")).unwrap();
    assert_eq!(log.trim(), "-F https://youtu.be/abc123");
}

#[tokio::test]
async fn cli_source_failure_is_diagnosed() {
    let _guard = lock_scripts();
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo "ERROR: HTTP Error 429: Too Many Requests" >&2
exit 1"#,
    );

    let err = CliFormatSource::new(script.display().to_string())
        .fetch_formats("https://youtu.be/abc123")
        .await
        .unwrap_err();

    match err {
        DownloadError::FormatFetch { reason, hint } => {
            assert!(reason.contains("exit code 1"));
            assert!(reason.contains("429"));
            assert_eq!(hint, Some(FailureReason::RateLimited));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn cli_source_blank_output_is_parse_error() {
    let _guard = lock_scripts();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exit 0");

    let err = CliFormatSource::new(script.display().to_string())
        .fetch_formats("https://youtu.be/abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Parse(_)));
}

#[tokio::test]
async fn cli_source_honours_timeout() {
    let _guard = lock_scripts();
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exec sleep 5");

    let err = CliFormatSource::new(script.display().to_string())
        .with_timeout(Some(1))
        .fetch_formats("https://youtu.be/abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Timeout { seconds: 1, .. }));
}

#[tokio::test]
async fn missing_binary_is_tool_not_found() {
    let _guard = lock_scripts();
    let dir = TempDir::new().unwrap();
    let err = CliFormatSource::new(dir.path().join("no-such-yt-dlp").display().to_string())
        .fetch_formats("https://youtu.be/abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::ToolNotFound(_)));
}

#[tokio::test]
async fn full_run_against_script() {
    let _guard = lock_scripts();
    let bin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let script = listing_script(bin.path());
    let downloader = downloader_for(&script);

    let outcome = downloader
        .run("https://youtube.com/watch?v=abc123", out.path())
        .await
        .unwrap();

    let video_dir = out.path().join("abc123");
    assert_eq!(
        outcome,
        RunOutcome::Downloaded {
            dir: video_dir.clone(),
            files: vec![video_dir.join("Clip [abc123].mkv")],
        }
    );
    assert!(!video_dir.join("temp").exists());
    assert!(!video_dir.join("Clip [abc123].en.vtt").exists());

    let log = fs::read_to_string(bin.path().join("args.log")).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].starts_with("--no-warnings -f 137+140-0+140-1 --audio-multistreams"));
    assert!(calls[1].contains("--merge-output-format mkv"));
    assert!(calls[1].contains(r#"ffmpeg:-metadata:s:a:0 title="English" -metadata:s:a:1 title="German""#));
    assert!(calls[1].ends_with("https://youtube.com/watch?v=abc123"));

    let again = downloader
        .run("https://youtube.com/watch?v=abc123", out.path())
        .await
        .unwrap();
    assert!(matches!(again, RunOutcome::Skipped { .. }));
    let log = fs::read_to_string(bin.path().join("args.log")).unwrap();
    assert_eq!(log.lines().count(), 2);
}

#[tokio::test]
async fn failed_download_reports_download_error() {
    let _guard = lock_scripts();
    let bin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let script = listing_then(
        bin.path(),
        r#"echo "ERROR: [youtube] abc123: Video unavailable" >&2
exit 1"#,
    );

    let err = downloader_for(&script)
        .run("https://youtu.be/abc123", out.path())
        .await
        .unwrap_err();

    match err {
        DownloadError::Download { hint, .. } => {
            assert_eq!(hint, Some(FailureReason::VideoUnavailable));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_utf8_output_is_drained_until_exit() {
    let _guard = lock_scripts();
    let bin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // Enough progress lines after the latin-1 byte to overflow a pipe buffer
    let script = listing_then(
        bin.path(),
        r#"printf '[download] Destination: Caf\351 [abc123].f137.mp4\n'
i=0
while [ $i -lt 4000 ]; do
echo "[download]  50.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
i=$((i+1))
done
printf 'mkv' > "Cafe [abc123].mkv"
exit 0"#,
    );

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        downloader_for(&script).run("https://youtu.be/abc123", out.path()),
    )
    .await
    .expect("download did not finish")
    .unwrap();

    let video_dir = out.path().join("abc123");
    assert_eq!(
        outcome,
        RunOutcome::Downloaded {
            dir: video_dir.clone(),
            files: vec![video_dir.join("Cafe [abc123].mkv")],
        }
    );
}

#[tokio::test]
async fn download_timeout_kills_ytdlp() {
    let _guard = lock_scripts();
    let bin = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let script = listing_then(bin.path(), "exec sleep 5");

    let config = DownloaderConfig {
        download_timeout_secs: Some(1),
        ..DownloaderConfig::default()
    };
    let downloader = downloader_with(config, &script);

    let err = downloader
        .run("https://youtu.be/abc123", out.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Timeout { seconds: 1, .. }));
    let video_dir = out.path().join("abc123");
    assert!(video_dir.join("temp").is_dir());
    assert!(!fs::read_dir(&video_dir)
        .unwrap()
        .any(|e| e.unwrap().path().extension().is_some_and(|x| x == "mkv")));
}
