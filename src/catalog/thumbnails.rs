//! Static thumbnail catalog for a video id

use serde::Serialize;

const THUMBNAIL_HOST: &str = "https://img.youtube.com/vi";

/// Thumbnail sizes published for every video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailQuality {
    MaxRes,
    Standard,
    High,
    Medium,
    Default,
}

impl ThumbnailQuality {
    /// Largest first
    pub const ALL: [ThumbnailQuality; 5] = [
        ThumbnailQuality::MaxRes,
        ThumbnailQuality::Standard,
        ThumbnailQuality::High,
        ThumbnailQuality::Medium,
        ThumbnailQuality::Default,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ThumbnailQuality::MaxRes => "maxresdefault",
            ThumbnailQuality::Standard => "sddefault",
            ThumbnailQuality::High => "hqdefault",
            ThumbnailQuality::Medium => "mqdefault",
            ThumbnailQuality::Default => "default",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThumbnailQuality::MaxRes => "Max Resolution",
            ThumbnailQuality::Standard => "Standard Definition",
            ThumbnailQuality::High => "High Quality",
            ThumbnailQuality::Medium => "Medium Quality",
            ThumbnailQuality::Default => "Default Quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailOption {
    pub quality: &'static str,
    pub label: &'static str,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailCatalog {
    pub video_id: String,
    pub thumbnails: Vec<ThumbnailOption>,
}

/// Build the thumbnail links for an already validated video id.
/// No network access: the URLs follow a fixed template.
pub fn thumbnail_catalog(video_id: &str) -> ThumbnailCatalog {
    let thumbnails = ThumbnailQuality::ALL
        .into_iter()
        .map(|q| ThumbnailOption {
            quality: q.key(),
            label: q.label(),
            url: format!("{}/{}/{}.jpg", THUMBNAIL_HOST, video_id, q.key()),
            filename: format!("{}_{}.jpg", video_id, q.key()),
        })
        .collect();

    ThumbnailCatalog {
        video_id: video_id.to_string(),
        thumbnails,
    }
}
