use crate::extractor::models::{SearchResult, VideoInfo};
use crate::streaming::FormatSelector;
use crate::utils::error::Result;
use crate::validator::{ValidQuery, ValidUrl};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Media bytes as they arrive from the extractor
pub type MediaStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Core trait for video extractors
///
/// The HTTP layer only talks to this trait, so it can be exercised without
/// a real yt-dlp binary.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Fetch metadata and raw formats for a single video
    async fn fetch_info(&self, url: &ValidUrl) -> Result<VideoInfo>;

    /// Search videos by free-text query
    async fn search(&self, query: &ValidQuery, limit: usize) -> Result<Vec<SearchResult>>;

    /// Start producing the media bytes for `selector`
    async fn open_stream(&self, url: &ValidUrl, selector: &FormatSelector) -> Result<MediaStream>;
}
