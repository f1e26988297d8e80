//! yt-dlp argument vectors
//!
//! Every user-controlled value (URL, search query, format selector) travels
//! as exactly one element of the argument vector handed to
//! `tokio::process::Command::args`, after a `--` end-of-options marker. No
//! shell is involved, so metacharacters reach yt-dlp verbatim and are never
//! interpreted.

use crate::utils::AppSettings;
use std::fmt;
use std::path::{Path, PathBuf};

/// Sentinel selector asking yt-dlp to extract audio as mp3
pub const MP3_SELECTOR: &str = "mp3";

/// What the yt-dlp invocation is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Metadata for a URL (`-j --skip-download`)
    FetchInfo { url: String },
    /// Same as `FetchInfo`, never expanding playlists
    FetchInfoNoPlaylist { url: String },
    /// `ytsearch<limit>:<query>`, one JSON object per line
    Search { query: String, limit: usize },
    /// Raw media bytes on stdout
    StreamFormat { url: String, selector: String },
}

/// Program plus arguments, ready for `Command::new(program).args(args)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Last element: the user-supplied target
    pub fn target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

/// Builds yt-dlp command lines with the fixed safety flags applied
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: PathBuf,
    socket_timeout_secs: u64,
    retries: u32,
    extractor_retries: u32,
}

impl CommandBuilder {
    pub fn new(program: impl Into<PathBuf>, settings: &AppSettings) -> Self {
        Self {
            program: program.into(),
            socket_timeout_secs: settings.socket_timeout_secs,
            retries: settings.retries,
            extractor_retries: settings.extractor_retries,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn build(&self, intent: &Intent) -> CommandLine {
        let mut args: Vec<String> = Vec::with_capacity(16);

        match intent {
            Intent::FetchInfo { url } => {
                push(&mut args, &["-j", "--skip-download", "--no-warnings"]);
                self.push_metadata_limits(&mut args);
                push_target(&mut args, url.clone());
            }
            Intent::FetchInfoNoPlaylist { url } => {
                push(
                    &mut args,
                    &["-j", "--skip-download", "--no-playlist", "--no-warnings"],
                );
                self.push_metadata_limits(&mut args);
                push_target(&mut args, url.clone());
            }
            Intent::Search { query, limit } => {
                push(&mut args, &["--dump-json", "--no-playlist", "--no-warnings"]);
                self.push_metadata_limits(&mut args);
                push_target(&mut args, format!("ytsearch{}:{}", limit, query));
            }
            Intent::StreamFormat { url, selector } => {
                if selector == MP3_SELECTOR {
                    push(&mut args, &["-f", "bestaudio", "-x", "--audio-format", "mp3"]);
                } else {
                    args.push("-f".to_string());
                    args.push(selector.clone());
                    if selector.contains('+') {
                        push(&mut args, &["--merge-output-format", "mp4"]);
                    }
                }
                push(&mut args, &["--no-playlist", "--no-warnings"]);
                args.push("--socket-timeout".to_string());
                args.push(self.socket_timeout_secs.to_string());
                args.push("--retries".to_string());
                args.push(self.retries.to_string());
                push(&mut args, &["-o", "-"]);
                push_target(&mut args, url.clone());
            }
        }

        CommandLine {
            program: self.program.clone(),
            args,
        }
    }

    fn push_metadata_limits(&self, args: &mut Vec<String>) {
        args.push("--extractor-retries".to_string());
        args.push(self.extractor_retries.to_string());
        args.push("--socket-timeout".to_string());
        args.push(self.socket_timeout_secs.to_string());
    }
}

fn push(args: &mut Vec<String>, flags: &[&str]) {
    args.extend(flags.iter().map(|f| f.to_string()));
}

fn push_target(args: &mut Vec<String>, target: String) {
    args.push("--".to_string());
    args.push(target);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new("yt-dlp", &AppSettings::default())
    }

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_fetch_info_flags() {
        let cmd = builder().build(&Intent::FetchInfo { url: URL.into() });
        assert_eq!(
            cmd.args,
            vec![
                "-j",
                "--skip-download",
                "--no-warnings",
                "--extractor-retries",
                "3",
                "--socket-timeout",
                "30",
                "--",
                URL
            ]
        );
    }

    #[test]
    fn test_no_playlist_flag() {
        let cmd = builder().build(&Intent::FetchInfoNoPlaylist { url: URL.into() });
        assert!(cmd.args.contains(&"--no-playlist".to_string()));
        assert_eq!(cmd.target(), Some(URL));
    }

    #[test]
    fn test_search_target() {
        let cmd = builder().build(&Intent::Search {
            query: "lofi hip hop".into(),
            limit: 5,
        });
        assert_eq!(cmd.target(), Some("ytsearch5:lofi hip hop"));
        assert!(cmd.args.contains(&"--dump-json".to_string()));
    }

    #[test]
    fn test_stream_mp3() {
        let cmd = builder().build(&Intent::StreamFormat {
            url: URL.into(),
            selector: "mp3".into(),
        });
        assert_eq!(&cmd.args[..6], &["-f", "bestaudio", "-x", "--audio-format", "mp3", "--no-playlist"]);
        assert!(cmd.args.windows(2).any(|w| w == ["-o", "-"]));
    }

    #[test]
    fn test_stream_composite_passes_through() {
        let cmd = builder().build(&Intent::StreamFormat {
            url: URL.into(),
            selector: "137+140".into(),
        });
        assert!(cmd.args.windows(2).any(|w| w == ["-f", "137+140"]));
        assert!(cmd
            .args
            .windows(2)
            .any(|w| w == ["--merge-output-format", "mp4"]));
    }

    #[test]
    fn test_stream_single_id_has_retry_and_timeout() {
        let cmd = builder().build(&Intent::StreamFormat {
            url: URL.into(),
            selector: "22".into(),
        });
        assert!(cmd.args.windows(2).any(|w| w == ["--retries", "3"]));
        assert!(cmd.args.windows(2).any(|w| w == ["--socket-timeout", "30"]));
        assert!(!cmd.args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn test_hostile_values_stay_single_arguments() {
        let hostile = [
            "a; rm -rf /",
            "a | cat /etc/passwd",
            "a && reboot",
            "$(id)",
            "`id`",
            "\"quoted\"",
            "'single'",
            "line\nbreak",
            "-o /tmp/pwned",
        ];
        for value in hostile {
            let stream = builder().build(&Intent::StreamFormat {
                url: value.into(),
                selector: value.into(),
            });
            let baseline = builder().build(&Intent::StreamFormat {
                url: URL.into(),
                selector: "18".into(),
            });
            assert_eq!(stream.args.len(), baseline.args.len(), "{value:?}");
            assert_eq!(stream.target(), Some(value));
            assert_eq!(stream.args.iter().filter(|a| a.as_str() == value).count(), 2);

            let info = builder().build(&Intent::FetchInfo { url: value.into() });
            assert_eq!(info.target(), Some(value));
            assert_eq!(info.args[info.args.len() - 2], "--");
        }
    }
}
