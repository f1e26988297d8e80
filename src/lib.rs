//! Tubefetch library
//!
//! A small web front end around yt-dlp: validates YouTube links and search
//! queries, turns yt-dlp's format list into a curated download catalog and
//! streams the chosen format straight from yt-dlp's stdout to the client.

pub mod catalog;
pub mod extractor;
pub mod server;
pub mod streaming;
pub mod utils;
pub mod validator;

// Re-export main types for easier use
pub use catalog::{normalize, CatalogEntry, VideoMetadata};
pub use extractor::{Extractor, RawFormat, SearchResult, VideoInfo, YtDlpExtractor};
pub use server::{router, AppState};
pub use streaming::{FormatSelector, StreamingResponder};
pub use utils::{AppSettings, TubefetchError};
pub use validator::{validate_search_query, validate_video_url, ValidQuery, ValidUrl};
