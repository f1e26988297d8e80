//! Running yt-dlp as a child process
//!
//! Two modes:
//! - text mode ([`ProcessExecutor::execute`]): wait for exit, capture stdout
//!   and stderr, classify the outcome.
//! - streaming mode ([`ProcessExecutor::spawn_stream`]): stdout is exposed as
//!   a byte stream; dropping the stream kills the child.

use crate::extractor::command::CommandLine;
use crate::extractor::parser::excerpt;
use crate::utils::error::{Result, TubefetchError};
use crate::utils::AppSettings;
use bytes::Bytes;
use futures::{ready, Future, Stream};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command as AsyncCommand};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

/// Marker yt-dlp prefixes its fatal messages with
pub const ERROR_MARKER: &str = "ERROR:";

/// Longest tool error excerpt surfaced to users
const ERROR_EXCERPT_BYTES: usize = 255;

/// How a text-mode run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    EmptyOutput,
    ToolError,
}

/// Captured output of a text-mode run
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: Vec<u8>,
    pub classification: Classification,
    /// Tool error excerpt, empty unless `ToolError`
    pub detail: String,
    pub status: Option<ExitStatus>,
}

impl ExecResult {
    /// Turn a non-success classification into the matching error
    pub fn into_payload(self) -> Result<String> {
        match self.classification {
            Classification::Success => Ok(String::from_utf8_lossy(&self.stdout).into_owned()),
            Classification::EmptyOutput => Err(TubefetchError::EmptyOutput),
            Classification::ToolError => Err(TubefetchError::ToolReported(self.detail)),
        }
    }
}

/// Classify captured output.
///
/// - nothing (after trimming) on either stream → `EmptyOutput`
/// - combined output shorter than `threshold`, containing [`ERROR_MARKER`]
///   and not shaped like JSON → `ToolError`
/// - empty stdout with the marker on stderr → `ToolError`
/// - empty stdout otherwise → `EmptyOutput`
/// - anything else → `Success`; JSON decoding has the final word
pub fn classify(stdout: &[u8], stderr: &[u8], threshold: usize) -> (Classification, String) {
    let out = String::from_utf8_lossy(stdout);
    let err = String::from_utf8_lossy(stderr);
    let combined = match (out.trim().is_empty(), err.trim().is_empty()) {
        (true, true) => return (Classification::EmptyOutput, String::new()),
        (false, true) => out.to_string(),
        (true, false) => err.to_string(),
        (false, false) => format!("{}\n{}", out, err),
    };

    let has_marker = contains_marker(&combined);
    let looks_like_json = matches!(combined.trim_start().chars().next(), Some('{') | Some('['));

    if combined.len() < threshold && has_marker && !looks_like_json {
        return (Classification::ToolError, error_excerpt(&combined));
    }

    if out.trim().is_empty() {
        if contains_marker(&err) {
            return (Classification::ToolError, error_excerpt(&err));
        }
        return (Classification::EmptyOutput, String::new());
    }

    if has_marker {
        debug!("Output mentions {} but is long or JSON-shaped; treating as success", ERROR_MARKER);
    }
    (Classification::Success, String::new())
}

fn contains_marker(text: &str) -> bool {
    text.to_ascii_uppercase().contains(ERROR_MARKER)
}

/// Excerpt starting at the first marker line, so the user sees the actual reason
fn error_excerpt(text: &str) -> String {
    let upper = text.to_ascii_uppercase();
    let start = upper.find(ERROR_MARKER).unwrap_or(0);
    excerpt(text[start..].trim(), ERROR_EXCERPT_BYTES).to_string()
}

/// Runs yt-dlp command lines
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
    error_output_threshold: usize,
    verbose_errors: bool,
}

impl ProcessExecutor {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            timeout: settings.exec_timeout(),
            error_output_threshold: settings.error_output_threshold,
            verbose_errors: !settings.production,
        }
    }

    /// Run once, wait for exit, classify. No retries beyond yt-dlp's own flags.
    pub async fn execute(&self, cmd: &CommandLine) -> Result<ExecResult> {
        debug!("Running: {}", cmd);

        let child = AsyncCommand::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn {}: {}", cmd, e);
                TubefetchError::Process(e)
            })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    // The future owning the child was dropped, so kill_on_drop reaps it
                    error!("Timed out after {:?}: {}", limit, cmd);
                    return Err(TubefetchError::Timeout(limit.as_secs()));
                }
            },
            None => child.wait_with_output().await?,
        };

        let (classification, detail) =
            classify(&output.stdout, &output.stderr, self.error_output_threshold);

        match classification {
            Classification::Success => {
                if !output.status.success() {
                    warn!("yt-dlp exited with {} but printed output: {}", output.status, cmd);
                }
            }
            Classification::EmptyOutput => {
                error!("Command produced no output ({}): {}", output.status, cmd);
            }
            Classification::ToolError => {
                error!("yt-dlp indicated an error. Command: {}. Output: {}", cmd, detail);
                if self.verbose_errors {
                    info!(
                        "Full stderr: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
            }
        }

        Ok(ExecResult {
            stdout: output.stdout,
            classification,
            detail,
            status: Some(output.status),
        })
    }

    /// Spawn for streaming: stdout is piped to the returned stream, stderr is
    /// drained into the log.
    pub fn spawn_stream(&self, cmd: &CommandLine) -> Result<ProcessStream> {
        debug!("Streaming: {}", cmd);

        let mut child = AsyncCommand::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn {}: {}", cmd, e);
                TubefetchError::Process(e)
            })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("yt-dlp: {}", line);
                }
            });
        }

        let stdout = child.stdout.take().ok_or_else(|| {
            TubefetchError::Process(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child stdout was not captured",
            ))
        })?;

        Ok(ProcessStream {
            inner: ReaderStream::new(stdout),
            child: Some(child),
            exit: None,
            finished: false,
        })
    }
}

type ExitFuture = Pin<Box<dyn Future<Output = std::io::Result<ExitStatus>> + Send>>;

/// Child stdout as a stream of byte chunks.
///
/// Owns the child: dropping the stream before it finishes (client went
/// away) kills yt-dlp. At end of output the exit status is checked, and a
/// failed run ends the stream with an error instead of a clean finish.
pub struct ProcessStream {
    inner: ReaderStream<ChildStdout>,
    child: Option<Child>,
    exit: Option<ExitFuture>,
    finished: bool,
}

impl ProcessStream {
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }
}

impl Stream for ProcessStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }

        if this.exit.is_none() {
            if let Some(chunk) = ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                return Poll::Ready(Some(chunk));
            }
            match this.child.take() {
                Some(mut child) => this.exit = Some(Box::pin(async move { child.wait().await })),
                None => {
                    this.finished = true;
                    return Poll::Ready(None);
                }
            }
        }

        let status = match this.exit.as_mut() {
            Some(exit) => ready!(exit.as_mut().poll(cx)),
            None => return Poll::Ready(None),
        };
        this.exit = None;
        this.finished = true;

        match status {
            Ok(status) if status.success() => Poll::Ready(None),
            Ok(status) => {
                error!("yt-dlp exited with {} mid-stream; output is truncated", status);
                Poll::Ready(Some(Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("yt-dlp exited with {}", status),
                ))))
            }
            Err(e) => {
                error!("Failed to wait for yt-dlp: {}", e);
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        // A pending exit future owns the child; kill_on_drop covers it
        let Some(child) = self.child.as_mut() else {
            return;
        };
        if let Ok(None) = child.try_wait() {
            warn!(
                "Stream dropped before completion, terminating yt-dlp (pid {:?})",
                child.id()
            );
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill yt-dlp: {}", e);
            }
        }
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Resolve the yt-dlp executable: explicit path first, then PATH, then
/// common install locations.
pub fn locate_ytdlp(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.components().count() == 1 {
            // Bare program name such as "yt-dlp_x86"; let PATH decide
            return which::which(path).map_err(|_| {
                error!("Configured yt-dlp {:?} not found on PATH", path);
                TubefetchError::YtDlpNotFound
            });
        }
        if path.is_file() {
            info!("Using configured yt-dlp: {}", path.display());
            return Ok(path.to_path_buf());
        }
        error!("Configured yt-dlp does not exist: {}", path.display());
        return Err(TubefetchError::YtDlpNotFound);
    }

    find_ytdlp().ok_or(TubefetchError::YtDlpNotFound)
}

/// Find yt-dlp with priority:
/// 1. System PATH
/// 2. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Ok(path) = which::which("yt-dlp") {
        info!("Using system yt-dlp: {:?}", path);
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        info!("Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates
        .into_iter()
        .find(|path| path.is_file() && is_executable(path))
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: usize = 200;

    #[test]
    fn test_classify_nothing() {
        assert_eq!(classify(b"", b"", T).0, Classification::EmptyOutput);
        assert_eq!(classify(b"  \n\t", b"\n", T).0, Classification::EmptyOutput);
    }

    #[test]
    fn test_classify_short_error() {
        let (class, detail) = classify(b"", b"ERROR: [youtube] abc: Private video", T);
        assert_eq!(class, Classification::ToolError);
        assert_eq!(detail, "ERROR: [youtube] abc: Private video");
    }

    #[test]
    fn test_classify_marker_is_case_insensitive() {
        let (class, _) = classify(b"error: boom", b"", T);
        assert_eq!(class, Classification::ToolError);
    }

    #[test]
    fn test_classify_json_with_marker_is_success() {
        let json = br#"{"id":"x","title":"ERROR: the movie"}"#;
        assert_eq!(classify(json, b"", T).0, Classification::Success);
    }

    #[test]
    fn test_classify_long_output_with_marker_is_success() {
        let long = format!("{} ERROR: inside a description", "x".repeat(300));
        assert_eq!(classify(long.as_bytes(), b"", T).0, Classification::Success);
    }

    #[test]
    fn test_classify_long_stderr_error_without_stdout() {
        let stderr = format!(
            "WARNING: {}\nERROR: [youtube] abc: Video unavailable",
            "w".repeat(400)
        );
        let (class, detail) = classify(b"", stderr.as_bytes(), T);
        assert_eq!(class, Classification::ToolError);
        assert!(detail.starts_with("ERROR: [youtube] abc"));
    }

    #[test]
    fn test_classify_stderr_noise_without_stdout_is_empty() {
        let (class, _) = classify(b"", b"WARNING: something harmless", T);
        assert_eq!(class, Classification::EmptyOutput);
    }

    #[test]
    fn test_error_excerpt_is_bounded() {
        let text = format!("ERROR: {}", "z".repeat(1000));
        assert_eq!(error_excerpt(&text).len(), ERROR_EXCERPT_BYTES);
    }

    #[test]
    fn test_into_payload() {
        let ok = ExecResult {
            stdout: b"{}".to_vec(),
            classification: Classification::Success,
            detail: String::new(),
            status: None,
        };
        assert_eq!(ok.into_payload().unwrap(), "{}");

        let tool = ExecResult {
            stdout: Vec::new(),
            classification: Classification::ToolError,
            detail: "ERROR: nope".into(),
            status: None,
        };
        assert!(matches!(
            tool.into_payload(),
            Err(TubefetchError::ToolReported(d)) if d == "ERROR: nope"
        ));
    }

    #[test]
    fn test_locate_missing_explicit_path() {
        let result = locate_ytdlp(Some(Path::new("/definitely/not/here/yt-dlp")));
        assert!(matches!(result, Err(TubefetchError::YtDlpNotFound)));
    }

    #[test]
    fn test_find_ytdlp() {
        let result = find_ytdlp();
        println!("yt-dlp found at: {:?}", result);
        // Don't assert - yt-dlp might not be installed in CI
    }
}
