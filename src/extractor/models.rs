//! Data structures for yt-dlp output

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Codec value yt-dlp uses for an absent stream
pub const CODEC_NONE: &str = "none";

/// Video information as reported by `yt-dlp -j`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    /// Required by [`parse_info`](crate::extractor::parse_info); search hits may lack it
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub duration_string: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub formats: Vec<RawFormat>,
}

impl VideoInfo {
    /// `thumbnail`, falling back to the first entry of `thumbnails`
    pub fn primary_thumbnail(&self) -> Option<&str> {
        non_empty(self.thumbnail.as_deref())
            .or_else(|| self.thumbnails.iter().find_map(|t| non_empty(t.url.as_deref())))
    }

    /// `thumbnail`, falling back to the last entry of `thumbnails` (usually the largest)
    pub fn largest_thumbnail(&self) -> Option<&str> {
        non_empty(self.thumbnail.as_deref()).or_else(|| {
            self.thumbnails
                .iter()
                .rev()
                .find_map(|t| non_empty(t.url.as_deref()))
        })
    }

    /// Display duration: `duration_string`, else formatted seconds, else "N/A"
    pub fn duration_label(&self) -> String {
        if let Some(label) = non_empty(self.duration_string.as_deref()) {
            return label.to_string();
        }
        match self.duration {
            Some(secs) if secs.is_finite() && secs >= 0.0 => format_duration(secs as u64),
            _ => "N/A".to_string(),
        }
    }

    /// Look up the container extension of one of this video's formats
    pub fn extension_of(&self, format_id: &str) -> Option<&str> {
        self.formats
            .iter()
            .find(|f| f.format_id.as_deref() == Some(format_id))
            .and_then(|f| non_empty(f.ext.as_deref()))
    }
}

/// One entry of the `thumbnails` array
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

/// Format descriptor as reported by yt-dlp
///
/// Every field is optional: yt-dlp omits or nulls them freely depending on
/// the extractor and protocol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub abr: Option<f64>, // Audio bitrate (kbps)
    #[serde(default)]
    pub tbr: Option<f64>, // Total bitrate (kbps)
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl RawFormat {
    pub fn id(&self) -> Option<&str> {
        non_empty(self.format_id.as_deref())
    }

    pub fn extension(&self) -> Option<&str> {
        non_empty(self.ext.as_deref())
    }

    /// Only plain http/https formats can be piped to the client
    pub fn is_http(&self) -> bool {
        matches!(self.protocol.as_deref(), Some("http") | Some("https"))
    }

    pub fn has_video(&self) -> bool {
        codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        codec_present(self.acodec.as_deref())
    }

    /// Exact size when known, else yt-dlp's estimate
    pub fn file_size_bytes(&self) -> Option<u64> {
        self.filesize
            .or(self.filesize_approx)
            .filter(|size| size.is_finite() && *size > 0.0)
            .map(|size| size as u64)
    }

    /// Best known bitrate: `abr`, else `tbr`
    pub fn bitrate(&self) -> Option<f64> {
        self.abr.or(self.tbr).filter(|b| b.is_finite() && *b > 0.0)
    }
}

/// One hit from a `ytsearchN:` query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub uploader: String,
    pub duration_label: String,
    pub canonical_url: String,
}

impl SearchResult {
    pub const WATCH_URL_PREFIX: &'static str = "https://www.youtube.com/watch?v=";

    pub fn from_info(info: &VideoInfo) -> Self {
        Self {
            id: info.id.clone(),
            title: non_empty(Some(info.title.as_str()))
                .unwrap_or("N/A")
                .to_string(),
            thumbnail_url: info.largest_thumbnail().unwrap_or_default().to_string(),
            uploader: non_empty(info.uploader.as_deref())
                .unwrap_or("N/A")
                .to_string(),
            duration_label: info.duration_label(),
            canonical_url: format!("{}{}", Self::WATCH_URL_PREFIX, info.id),
        }
    }
}

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != CODEC_NONE)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Format seconds as M:SS or H:MM:SS
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a JSON array of `T`, skipping elements that do not decode.
/// Anything that is not an array becomes an empty list.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping undecodable list entry: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formats_not_an_array_is_empty() {
        let info: VideoInfo =
            serde_json::from_value(json!({"id": "a", "title": "t", "formats": "oops"})).unwrap();
        assert!(info.formats.is_empty());

        let info: VideoInfo = serde_json::from_value(json!({"id": "a", "title": "t"})).unwrap();
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_bad_format_entry_is_skipped() {
        let info: VideoInfo = serde_json::from_value(json!({
            "id": "a",
            "title": "t",
            "formats": [
                {"format_id": "18", "ext": "mp4", "height": "tall"},
                {"format_id": "22", "ext": "mp4", "height": 720}
            ]
        }))
        .unwrap();
        assert_eq!(info.formats.len(), 1);
        assert_eq!(info.formats[0].id(), Some("22"));
    }

    #[test]
    fn test_codec_sentinel() {
        let f = RawFormat {
            vcodec: Some("avc1.64001F".into()),
            acodec: Some("none".into()),
            ..Default::default()
        };
        assert!(f.has_video());
        assert!(!f.has_audio());
        assert!(!RawFormat::default().has_video());
    }

    #[test]
    fn test_file_size_prefers_exact() {
        let f = RawFormat {
            filesize: Some(100.0),
            filesize_approx: Some(250.0),
            ..Default::default()
        };
        assert_eq!(f.file_size_bytes(), Some(100));

        let approx = RawFormat {
            filesize_approx: Some(250.4),
            ..Default::default()
        };
        assert_eq!(approx.file_size_bytes(), Some(250));
        assert_eq!(RawFormat::default().file_size_bytes(), None);
    }

    #[test]
    fn test_duration_label() {
        let mut info = VideoInfo {
            duration_string: Some("3:33".into()),
            duration: Some(999.0),
            ..Default::default()
        };
        assert_eq!(info.duration_label(), "3:33");

        info.duration_string = None;
        assert_eq!(info.duration_label(), "16:39");

        info.duration = Some(3725.0);
        assert_eq!(info.duration_label(), "1:02:05");

        info.duration = None;
        assert_eq!(info.duration_label(), "N/A");
    }

    #[test]
    fn test_thumbnail_fallbacks() {
        let info = VideoInfo {
            thumbnails: vec![
                Thumbnail { url: Some("first.jpg".into()) },
                Thumbnail { url: Some("last.jpg".into()) },
            ],
            ..Default::default()
        };
        assert_eq!(info.primary_thumbnail(), Some("first.jpg"));
        assert_eq!(info.largest_thumbnail(), Some("last.jpg"));

        let direct = VideoInfo {
            thumbnail: Some("main.jpg".into()),
            ..info
        };
        assert_eq!(direct.primary_thumbnail(), Some("main.jpg"));
        assert_eq!(direct.largest_thumbnail(), Some("main.jpg"));
    }

    #[test]
    fn test_search_result_from_info() {
        let info = VideoInfo {
            id: "dQw4w9WgXcQ".into(),
            title: "Song".into(),
            uploader: None,
            ..Default::default()
        };
        let result = SearchResult::from_info(&info);
        assert_eq!(
            result.canonical_url,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(result.uploader, "N/A");
        assert_eq!(result.duration_label, "N/A");
        assert_eq!(result.thumbnail_url, "");
    }
}
