//! Decoding of yt-dlp JSON output

use crate::extractor::models::{SearchResult, VideoInfo};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Longest payload excerpt written to the log on parse failures
const LOG_EXCERPT_BYTES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed-json: {0}")]
    MalformedJson(String),

    #[error("missing-required-fields: {0}")]
    MissingRequiredFields(String),
}

/// Decode the single JSON object printed by `yt-dlp -j`.
///
/// The object must carry string `id` and `title` fields. A missing or
/// non-array `formats` field yields an empty format list.
pub fn parse_info(raw: &str) -> Result<VideoInfo, ParseError> {
    let trimmed = raw.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        // yt-dlp prints one object per line if it ever expands a playlist
        Err(first_err) => match trimmed.lines().find(|l| !l.trim().is_empty()) {
            Some(line) if line.len() < trimmed.len() => serde_json::from_str(line)
                .map_err(|_| malformed(first_err, trimmed))?,
            _ => return Err(malformed(first_err, trimmed)),
        },
    };

    let Value::Object(ref map) = value else {
        warn!("yt-dlp JSON is not an object: {}", excerpt(trimmed, LOG_EXCERPT_BYTES));
        return Err(ParseError::MissingRequiredFields(
            "expected a JSON object".to_string(),
        ));
    };

    let missing: Vec<&str> = ["id", "title"]
        .into_iter()
        .filter(|key| !map.get(*key).is_some_and(Value::is_string))
        .collect();
    if !missing.is_empty() {
        warn!(
            "yt-dlp JSON lacks {:?}: {}",
            missing,
            excerpt(trimmed, LOG_EXCERPT_BYTES)
        );
        return Err(ParseError::MissingRequiredFields(missing.join(", ")));
    }

    serde_json::from_value(value).map_err(|e| {
        warn!("Failed to decode video info: {}", e);
        ParseError::MissingRequiredFields(e.to_string())
    })
}

/// Decode newline-delimited search results lazily, one line at a time.
///
/// Blank lines are ignored; lines that are not JSON objects with an `id`
/// are logged and skipped.
pub fn parse_search_lines(raw: &str) -> impl Iterator<Item = SearchResult> + '_ {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<VideoInfo>(line) {
            Ok(info) if !info.id.trim().is_empty() => Some(SearchResult::from_info(&info)),
            Ok(_) => {
                warn!("Skipping search result without id: {}", excerpt(line, 200));
                None
            }
            Err(e) => {
                warn!(
                    "Skipping malformed search line ({}): {}",
                    e,
                    excerpt(line, 200)
                );
                None
            }
        })
}

fn malformed(err: serde_json::Error, payload: &str) -> ParseError {
    warn!(
        "Failed to parse yt-dlp JSON: {}. Output: {}",
        err,
        excerpt(payload, LOG_EXCERPT_BYTES)
    );
    ParseError::MalformedJson(err.to_string())
}

/// First `max` bytes of `s`, cut on a char boundary
pub fn excerpt(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
