//! Input validation for video URLs and search queries
//!
//! Everything a user submits passes through here before any subprocess is
//! spawned. A URL is accepted only when it parses and matches one of the
//! known YouTube shapes:
//!
//! - `https://www.youtube.com/watch?v=<id>`
//! - `https://youtu.be/<id>`
//! - `https://www.youtube.com/shorts/<id>`
//! - `https://www.youtube.com/embed/<id>`
//!
//! where `<id>` is exactly 11 characters of `[A-Za-z0-9_-]`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::Url;

static VIDEO_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id regex"));

/// Hosts serving the long `/watch`, `/shorts/` and `/embed/` shapes
const LONG_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

/// Hosts serving the short-link `/<id>` shape
const SHORT_HOSTS: [&str; 2] = ["youtu.be", "www.youtu.be"];

/// Longest accepted search query, in characters
pub const MAX_QUERY_CHARS: usize = 200;

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Missing,
    Malformed,
    UnrecognizedShape,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::Missing => "missing",
            ValidationErrorKind::Malformed => "malformed",
            ValidationErrorKind::UnrecognizedShape => "unrecognized-shape",
        }
    }
}

/// A rejected input, with a message that is safe to show to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: &'static str, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    pub fn message(&self) -> String {
        match (self.field, self.kind) {
            ("url", ValidationErrorKind::Missing) => "URL parameter missing".to_string(),
            ("url", ValidationErrorKind::Malformed) => "Invalid URL format".to_string(),
            ("url", ValidationErrorKind::UnrecognizedShape) => {
                "Invalid YouTube URL. Please use a video link such as youtube.com/watch?v=..."
                    .to_string()
            }
            ("query", ValidationErrorKind::Missing) => "Search query cannot be empty".to_string(),
            ("query", ValidationErrorKind::Malformed) => {
                format!("Search query is too long (max {} characters)", MAX_QUERY_CHARS)
            }
            (field, kind) => format!("Invalid {}: {}", field, kind.as_str()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// A URL that passed validation, together with the video id it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUrl {
    url: Url,
    video_id: String,
}

impl ValidUrl {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

impl fmt::Display for ValidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A trimmed, non-empty search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery(String);

impl ValidQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate a candidate video URL.
pub fn validate_video_url(input: Option<&str>) -> Result<ValidUrl, ValidationError> {
    let candidate = input.map(str::trim).unwrap_or_default();
    if candidate.is_empty() {
        return Err(ValidationError::new("url", ValidationErrorKind::Missing));
    }

    let url = Url::parse(candidate)
        .map_err(|_| ValidationError::new("url", ValidationErrorKind::Malformed))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ValidationError::new("url", ValidationErrorKind::Malformed));
    }

    let video_id = extract_video_id(&url)
        .ok_or_else(|| ValidationError::new("url", ValidationErrorKind::UnrecognizedShape))?;

    Ok(ValidUrl { url, video_id })
}

/// Validate a search query: any non-empty string after trimming.
pub fn validate_search_query(input: Option<&str>) -> Result<ValidQuery, ValidationError> {
    let query = input.map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ValidationError::new("query", ValidationErrorKind::Missing));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ValidationError::new("query", ValidationErrorKind::Malformed));
    }
    Ok(ValidQuery(query.to_string()))
}

fn extract_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if SHORT_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            [id] => Some(id.to_string()),
            _ => None,
        }
    } else if LONG_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            ["shorts", id] | ["embed", id] => Some(id.to_string()),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID_REGEX.is_match(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(input: &str) -> ValidationErrorKind {
        validate_video_url(Some(input)).unwrap_err().kind
    }

    #[test]
    fn test_accepts_known_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ?t=42  ",
        ] {
            let valid = validate_video_url(Some(url)).unwrap_or_else(|e| panic!("{url}: {e}"));
            assert_eq!(valid.video_id(), "dQw4w9WgXcQ");
        }
    }

    #[test]
    fn test_rejects_missing() {
        assert_eq!(
            validate_video_url(None).unwrap_err().kind,
            ValidationErrorKind::Missing
        );
        assert_eq!(kind_of("   "), ValidationErrorKind::Missing);
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(kind_of("not a url"), ValidationErrorKind::Malformed);
        assert_eq!(kind_of("ftp://youtube.com/watch?v=dQw4w9WgXcQ"), ValidationErrorKind::Malformed);
    }

    #[test]
    fn test_rejects_wrong_host() {
        assert_eq!(
            kind_of("https://example.com/watch?v=dQw4w9WgXcQ"),
            ValidationErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind_of("https://youtube.com.evil.net/watch?v=dQw4w9WgXcQ"),
            ValidationErrorKind::UnrecognizedShape
        );
    }

    #[test]
    fn test_rejects_bad_id_length() {
        assert_eq!(
            kind_of("https://www.youtube.com/watch?v=dQw4w9WgXc"),
            ValidationErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind_of("https://www.youtube.com/watch?v=dQw4w9WgXcQQ"),
            ValidationErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind_of("https://youtu.be/dQw4w9WgXcQQ"),
            ValidationErrorKind::UnrecognizedShape
        );
    }

    #[test]
    fn test_rejects_metacharacters_in_id() {
        assert_eq!(
            kind_of("https://www.youtube.com/watch?v=dQw4w9W;rm%20-rf"),
            ValidationErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind_of("https://www.youtube.com/shorts/$(reboot)xx"),
            ValidationErrorKind::UnrecognizedShape
        );
    }

    #[test]
    fn test_rejects_other_paths() {
        assert_eq!(
            kind_of("https://www.youtube.com/playlist?list=PL123"),
            ValidationErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind_of("https://www.youtube.com/shorts/dQw4w9WgXcQ/extra"),
            ValidationErrorKind::UnrecognizedShape
        );
    }

    #[test]
    fn test_search_query() {
        assert_eq!(
            validate_search_query(Some("  lofi hip hop ")).unwrap().as_str(),
            "lofi hip hop"
        );
        assert_eq!(
            validate_search_query(Some(" \t ")).unwrap_err().kind,
            ValidationErrorKind::Missing
        );
        assert_eq!(
            validate_search_query(None).unwrap_err().kind,
            ValidationErrorKind::Missing
        );
        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert_eq!(
            validate_search_query(Some(&long)).unwrap_err().kind,
            ValidationErrorKind::Malformed
        );
    }

    #[test]
    fn test_messages_are_distinct() {
        let missing = ValidationError::new("url", ValidationErrorKind::Missing).to_string();
        let malformed = ValidationError::new("url", ValidationErrorKind::Malformed).to_string();
        let shape = ValidationError::new("url", ValidationErrorKind::UnrecognizedShape).to_string();
        assert_ne!(missing, malformed);
        assert_ne!(malformed, shape);
    }
}
