//! Streaming responder
//!
//! Turns a validated URL and a catalog selection into an attachment
//! response whose body is yt-dlp's stdout, forwarded chunk by chunk as it
//! arrives. Nothing is buffered to disk or held in memory in full.
//!
//! Everything that can fail (selector check, metadata pre-flight, spawning
//! yt-dlp) happens before the response exists, so a failure can still be
//! rendered as a normal error page.

pub mod selector;

pub use selector::FormatSelector;

use crate::extractor::{Extractor, VideoInfo};
use crate::utils::error::Result;
use crate::validator::ValidUrl;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extension used when a single format id is not found in the metadata
pub const DEFAULT_FALLBACK_EXTENSION: &str = "mp4";

/// Filename stem when nothing survives sanitizing
const FALLBACK_STEM: &str = "video";

/// Keep only `[A-Za-z0-9_.-]`; leading dots are dropped so the result is
/// never a hidden file or a relative path component
pub fn sanitize_filename_stem(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let kept = kept.trim_start_matches('.');

    if kept.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        kept.to_string()
    }
}

/// Extensions reported by yt-dlp are trusted only when purely alphanumeric
fn clean_extension(ext: &str) -> Option<&str> {
    let ext = ext.trim();
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// File extension of the download
///
/// `mp3` for audio extraction, `mp4` for muxed output, otherwise the
/// container of the chosen format, falling back to `fallback`.
pub fn resolve_extension(
    selector: &FormatSelector,
    info: Option<&VideoInfo>,
    fallback: &str,
) -> String {
    match selector {
        FormatSelector::Mp3 => "mp3".to_string(),
        FormatSelector::Composite(_) => "mp4".to_string(),
        FormatSelector::Single(id) => info
            .and_then(|info| info.extension_of(id))
            .and_then(clean_extension)
            .or_else(|| clean_extension(fallback))
            .unwrap_or(DEFAULT_FALLBACK_EXTENSION)
            .to_string(),
    }
}

/// Headers for a binary attachment that must not be cached
pub fn attachment_headers(filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );

    let disposition = format!("attachment; filename=\"{}\"", filename);
    let disposition = HeaderValue::from_str(&disposition).unwrap_or_else(|_| {
        warn!("Unusable filename for Content-Disposition: {:?}", filename);
        HeaderValue::from_static("attachment")
    });
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    headers.insert(
        HeaderName::from_static("content-transfer-encoding"),
        HeaderValue::from_static("binary"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}

/// Everything needed to start the stream, resolved up front
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDownload {
    pub selector: FormatSelector,
    pub filename: String,
}

/// Streams a chosen format back to the client
#[derive(Clone)]
pub struct StreamingResponder {
    extractor: Arc<dyn Extractor>,
}

impl StreamingResponder {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Resolve filename and extension.
    ///
    /// `known` is metadata the caller already fetched for this request; when
    /// absent it is fetched here, and a failure aborts before any header is
    /// produced.
    pub async fn prepare(
        &self,
        url: &ValidUrl,
        selector: FormatSelector,
        known: Option<&VideoInfo>,
    ) -> Result<PreparedDownload> {
        let fetched;
        let info = match known {
            Some(info) => info,
            None => {
                debug!("Pre-flight metadata fetch for {}", url);
                fetched = self.extractor.fetch_info(url).await?;
                &fetched
            }
        };

        let ext = resolve_extension(&selector, Some(info), DEFAULT_FALLBACK_EXTENSION);
        let filename = format!("{}.{}", sanitize_filename_stem(&info.title), ext);

        Ok(PreparedDownload { selector, filename })
    }

    /// Start yt-dlp and hand its stdout to the response body.
    ///
    /// Dropping the response body (client disconnect) drops the stream,
    /// which terminates the child.
    pub async fn respond(&self, url: &ValidUrl, prepared: PreparedDownload) -> Result<Response> {
        let stream = self
            .extractor
            .open_stream(url, &prepared.selector)
            .await?;

        info!(
            "Sending {} as attachment \"{}\"",
            prepared.selector, prepared.filename
        );

        let headers = attachment_headers(&prepared.filename);
        Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
    }

    /// [`prepare`](Self::prepare) then [`respond`](Self::respond)
    pub async fn stream(
        &self,
        url: &ValidUrl,
        selector: FormatSelector,
        known: Option<&VideoInfo>,
    ) -> Result<Response> {
        let prepared = self.prepare(url, selector, known).await?;
        self.respond(url, prepared).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::RawFormat;
    use crate::extractor::{MediaStream, SearchResult};
    use crate::utils::error::TubefetchError;
    use crate::validator::{validate_video_url, ValidQuery};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeExtractor {
        info: Option<VideoInfo>,
        fetches: AtomicUsize,
        streamed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        fn id(&self) -> &'static str {
            "fake"
        }

        async fn fetch_info(&self, _url: &ValidUrl) -> Result<VideoInfo> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.info.clone().ok_or(TubefetchError::EmptyOutput)
        }

        async fn search(&self, _query: &ValidQuery, _limit: usize) -> Result<Vec<SearchResult>> {
            Ok(Vec::new())
        }

        async fn open_stream(&self, _url: &ValidUrl, selector: &FormatSelector) -> Result<MediaStream> {
            self.streamed.lock().unwrap().push(selector.to_string());
            let chunks: Vec<std::io::Result<Bytes>> =
                vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn sample_info() -> VideoInfo {
        VideoInfo {
            id: "dQw4w9WgXcQ".into(),
            title: "Never Gonna: Give/You Up!".into(),
            formats: vec![RawFormat {
                format_id: Some("251".into()),
                ext: Some("webm".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn url() -> ValidUrl {
        validate_video_url(Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")).unwrap()
    }

    #[test]
    fn test_sanitize_filename_stem() {
        assert_eq!(sanitize_filename_stem("Never Gonna: Give/You Up!"), "NeverGonnaGiveYouUp");
        assert_eq!(sanitize_filename_stem("clip_v1.2-final"), "clip_v1.2-final");
        assert_eq!(sanitize_filename_stem("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename_stem("日本語"), "video");
        assert_eq!(sanitize_filename_stem(""), "video");
    }

    #[test]
    fn test_resolve_extension() {
        let info = sample_info();
        assert_eq!(resolve_extension(&FormatSelector::Mp3, Some(&info), "mp4"), "mp3");
        assert_eq!(
            resolve_extension(&FormatSelector::Composite("137+140".into()), None, "webm"),
            "mp4"
        );
        assert_eq!(
            resolve_extension(&FormatSelector::Single("251".into()), Some(&info), "mp4"),
            "webm"
        );
        assert_eq!(
            resolve_extension(&FormatSelector::Single("999".into()), Some(&info), "mkv"),
            "mkv"
        );
        assert_eq!(
            resolve_extension(&FormatSelector::Single("999".into()), None, "../x"),
            "mp4"
        );
    }

    #[test]
    fn test_attachment_headers() {
        let headers = attachment_headers("song.mp3");
        assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"song.mp3\""
        );
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], "0");
        assert_eq!(headers["content-transfer-encoding"], "binary");
    }

    #[tokio::test]
    async fn test_prepare_reuses_known_metadata() {
        let fake = Arc::new(FakeExtractor::default());
        let responder = StreamingResponder::new(fake.clone());
        let info = sample_info();

        let prepared = responder
            .prepare(&url(), FormatSelector::Single("251".into()), Some(&info))
            .await
            .unwrap();
        assert_eq!(prepared.filename, "NeverGonnaGiveYouUp.webm");
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prepare_fetches_when_unknown() {
        let fake = Arc::new(FakeExtractor {
            info: Some(sample_info()),
            ..Default::default()
        });
        let responder = StreamingResponder::new(fake.clone());

        let prepared = responder
            .prepare(&url(), FormatSelector::Mp3, None)
            .await
            .unwrap();
        assert_eq!(prepared.filename, "NeverGonnaGiveYouUp.mp3");
        assert_eq!(fake.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preflight_failure_starts_no_stream() {
        let fake = Arc::new(FakeExtractor::default());
        let responder = StreamingResponder::new(fake.clone());

        let result = responder
            .stream(&url(), FormatSelector::Single("22".into()), None)
            .await;
        assert!(matches!(result, Err(TubefetchError::EmptyOutput)));
        assert!(fake.streamed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_response() {
        let fake = Arc::new(FakeExtractor::default());
        let responder = StreamingResponder::new(fake.clone());
        let info = sample_info();

        let response = responder
            .stream(&url(), FormatSelector::Composite("137+140".into()), Some(&info))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"NeverGonnaGiveYouUp.mp4\""
        );
        assert_eq!(*fake.streamed.lock().unwrap(), vec!["137+140".to_string()]);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abcdef");
    }
}
