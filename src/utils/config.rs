//! Application configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound for `ytsearchN:` result counts
pub const MAX_SEARCH_LIMIT: usize = 20;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Explicit yt-dlp executable; discovered on PATH when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Value for yt-dlp `--socket-timeout` (seconds)
    pub socket_timeout_secs: u64,

    /// Value for yt-dlp `--retries` when streaming
    pub retries: u32,

    /// Value for yt-dlp `--extractor-retries` for metadata lookups
    pub extractor_retries: u32,

    /// Number of results requested per search
    pub search_limit: usize,

    /// Wall-clock limit for metadata/search subprocesses, 0 disables it
    pub exec_timeout_secs: u64,

    /// Output shorter than this (bytes) is eligible for the tool-error check
    pub error_output_threshold: usize,

    /// When false, tool error excerpts are logged at info as well
    pub production: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            socket_timeout_secs: 30,
            retries: 3,
            extractor_retries: 3,
            search_limit: 5,
            exec_timeout_secs: 120,
            error_output_threshold: 200,
            production: true,
        }
    }
}

impl AppSettings {
    /// Load settings: defaults, then the JSON config file (if any), then environment.
    ///
    /// An explicit `path` must exist; the per-user default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate();
        Ok(settings)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: AppSettings = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Overlay `TUBEFETCH_*` environment variables. Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TUBEFETCH_YTDLP_PATH").filter(|v| !v.trim().is_empty()) {
            self.ytdlp_path = Some(PathBuf::from(path));
        }
        if let Some(bind) = lookup("TUBEFETCH_BIND") {
            match bind.parse() {
                Ok(addr) => self.bind_addr = addr,
                Err(e) => warn!("Ignoring TUBEFETCH_BIND={:?}: {}", bind, e),
            }
        }
        if let Some(limit) = lookup("TUBEFETCH_SEARCH_LIMIT") {
            match limit.parse() {
                Ok(n) => self.search_limit = n,
                Err(e) => warn!("Ignoring TUBEFETCH_SEARCH_LIMIT={:?}: {}", limit, e),
            }
        }
        if let Some(timeout) = lookup("TUBEFETCH_EXEC_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.exec_timeout_secs = secs,
                Err(e) => warn!("Ignoring TUBEFETCH_EXEC_TIMEOUT={:?}: {}", timeout, e),
            }
        }
    }

    /// Enforce sane minimums and maximums
    pub fn validate(&mut self) {
        self.search_limit = self.search_limit.clamp(1, MAX_SEARCH_LIMIT);
        if self.socket_timeout_secs == 0 {
            self.socket_timeout_secs = 1;
        }
        if self.error_output_threshold == 0 {
            self.error_output_threshold = 1;
        }
    }

    /// Outer timeout for text-mode subprocess calls
    pub fn exec_timeout(&self) -> Option<Duration> {
        (self.exec_timeout_secs > 0).then(|| Duration::from_secs(self.exec_timeout_secs))
    }
}

/// `<config_dir>/tubefetch/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tubefetch").join("config.json"))
}
