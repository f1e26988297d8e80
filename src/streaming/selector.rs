//! Format selector sanitizing

use crate::catalog::MP3_ID;
use crate::utils::error::{Result, TubefetchError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static SELECTOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_+\-]+$").expect("format selector regex")
});

/// A format id the user picked from the catalog, checked against a strict
/// allow-list before it can reach a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
    /// Extract best audio and convert to mp3
    Mp3,
    /// A single yt-dlp format id
    Single(String),
    /// `<video>+<audio>`, muxed by yt-dlp while streaming
    Composite(String),
}

impl FormatSelector {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !SELECTOR_REGEX.is_match(raw) {
            return Err(TubefetchError::InvalidFormatSelector(raw.to_string()));
        }

        if raw == MP3_ID {
            return Ok(FormatSelector::Mp3);
        }
        if raw.contains('+') {
            if raw.split('+').any(str::is_empty) {
                return Err(TubefetchError::InvalidFormatSelector(raw.to_string()));
            }
            return Ok(FormatSelector::Composite(raw.to_string()));
        }
        Ok(FormatSelector::Single(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FormatSelector::Mp3 => MP3_ID,
            FormatSelector::Single(id) | FormatSelector::Composite(id) => id,
        }
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
