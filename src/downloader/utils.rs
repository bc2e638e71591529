// Helper functions for running yt-dlp and shuffling output files

use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::{DownloadError, Result};

fn spawn_error(program: &str, e: std::io::Error) -> DownloadError {
    if e.kind() == ErrorKind::NotFound {
        DownloadError::ToolNotFound(format!("{} is not on the search path", program))
    } else {
        DownloadError::ToolNotFound(format!("failed to start {}: {}", program, e))
    }
}

/// Summary of a failed exit, ending with the last non-empty stderr line
pub fn describe_failure(status: &ExitStatus, stderr: &str) -> String {
    let code = status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    let tail = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim();
    if tail.is_empty() {
        format!("exit code {}", code)
    } else {
        format!("exit code {}: {}", code, tail)
    }
}

/// Run a command to completion, capturing stdout and stderr.
///
/// With `timeout_secs` set the child is killed once the deadline passes.
/// Output is only returned after the process has exited.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    working_dir: Option<&Path>,
    timeout_secs: Option<u64>,
) -> Result<Output> {
    let mut cmd = TokioCommand::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ToolNotFound(format!("no stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ToolNotFound(format!("no stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let status = match wait_with_deadline(&mut child, program, timeout_secs).await {
        Ok(status) => status,
        Err(e) => {
            stdout_task.abort();
            stderr_task.abort();
            return Err(e);
        }
    };

    let stdout = join_pipe(stdout_task, program).await?;
    let stderr = join_pipe(stderr_task, program).await?;
    Ok(Output { status, stdout, stderr })
}

/// Run a command, handing each stdout line to `on_line` as it arrives.
///
/// Stderr is collected and returned together with the exit status.
pub async fn run_streaming_with_timeout<F>(
    program: &str,
    args: &[String],
    working_dir: &Path,
    timeout_secs: Option<u64>,
    mut on_line: F,
) -> Result<(ExitStatus, String)>
where
    F: FnMut(&str),
{
    let mut child = TokioCommand::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ToolNotFound(format!("no stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ToolNotFound(format!("no stderr from {}", program)))?;

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let pump = async {
        // Raw bytes: a title in a legacy codepage must not stop the drain,
        // or the child blocks on a full pipe.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    on_line(line.trim_end_matches(&['\n', '\r'][..]));
                }
                Err(e) => {
                    tracing::warn!(program, error = %e, "stopped reading stdout");
                    break;
                }
            }
        }
        child.wait().await
    };

    let waited = match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), pump).await {
            Ok(res) => res,
            Err(_) => {
                // child is killed on drop
                stderr_task.abort();
                return Err(DownloadError::Timeout {
                    program: program.to_string(),
                    seconds: secs,
                });
            }
        },
        None => pump.await,
    };

    let status = waited.map_err(|e| {
        DownloadError::ToolNotFound(format!("failed to wait for {}: {}", program, e))
    })?;
    let stderr = join_pipe(stderr_task, program).await?;
    Ok((status, String::from_utf8_lossy(&stderr).into_owned()))
}

async fn wait_with_deadline(
    child: &mut tokio::process::Child,
    program: &str,
    timeout_secs: Option<u64>,
) -> Result<ExitStatus> {
    let waited = match timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(res) => res,
            Err(_) => {
                let _ = child.kill().await;
                return Err(DownloadError::Timeout {
                    program: program.to_string(),
                    seconds: secs,
                });
            }
        },
        None => child.wait().await,
    };
    waited.map_err(|e| DownloadError::ToolNotFound(format!("failed to wait for {}: {}", program, e)))
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
    program: &str,
) -> Result<Vec<u8>> {
    match task.await {
        Ok(Ok(buf)) => Ok(buf),
        Ok(Err(e)) => Err(DownloadError::ToolNotFound(format!(
            "failed to read output of {}: {}",
            program, e
        ))),
        Err(e) => Err(DownloadError::ToolNotFound(format!(
            "output reader for {} failed: {}",
            program, e
        ))),
    }
}

/// Parse yt-dlp progress lines like:
/// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)
/// Returns (percent, status_string)
pub fn parse_ytdlp_progress(line: &str) -> Option<(f32, String)> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger\]\s+Merging formats into\s+(.+)").unwrap();
        static ref EMBED_SUBS_RE: Regex = Regex::new(r"\[EmbedSubtitle\]").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let status = match (caps.get(3), caps.get(4)) {
            (Some(speed), Some(eta)) => format!(
                "{:.1}% of {} at {} ETA {}",
                percent,
                size,
                speed.as_str(),
                eta.as_str()
            ),
            (Some(speed), None) => format!("{:.1}% of {} at {}", percent, size, speed.as_str()),
            _ => format!("{:.1}% of {}", percent, size),
        };
        return Some((percent, status));
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        return Some((0.0, format!("starting {}", short_name)));
    }

    if MERGE_RE.is_match(line) {
        return Some((100.0, "merging streams".to_string()));
    }

    if EMBED_SUBS_RE.is_match(line) {
        return Some((100.0, "embedding subtitles".to_string()));
    }

    None
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}

/// Regular files directly inside `dir` whose extension is one of `exts`, sorted
pub fn files_with_extensions(dir: &Path, exts: &[String]) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DownloadError::filesystem(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DownloadError::filesystem(dir, e))?;
        let path = entry.path();
        if path.is_file() && exts.iter().any(|ext| has_extension(&path, ext)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// True when `dir` exists and holds at least one file with extension `ext`
pub fn contains_file_with_extension(dir: &Path, ext: &str) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    Ok(!files_with_extensions(dir, &[ext.to_string()])?.is_empty())
}

/// Move `src` to `dest`: rename, or copy and remove when rename is refused
pub fn move_file(src: &Path, dest: &Path) -> Result<()> {
    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                src = %src.display(),
                dest = %dest.display(),
                error = %rename_err,
                "rename failed, copying instead"
            );
            std::fs::copy(src, dest).map_err(|e| DownloadError::filesystem(dest, e))?;
            std::fs::remove_file(src).map_err(|e| DownloadError::filesystem(src, e))
        }
    }
}

/// Delete every file directly inside `dir` with one of `exts`; returns the count
pub fn remove_files_with_extensions(dir: &Path, exts: &[String]) -> Result<usize> {
    let files = files_with_extensions(dir, exts)?;
    for file in &files {
        std::fs::remove_file(file).map_err(|e| DownloadError::filesystem(file, e))?;
        tracing::debug!(path = %file.display(), "removed sidecar");
    }
    Ok(files.len())
}

pub fn create_dir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DownloadError::filesystem(dir, e))
}

/// Remove a directory tree; a directory that is already gone is fine
pub fn remove_dir_all(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DownloadError::filesystem(dir, e)),
    }
}
