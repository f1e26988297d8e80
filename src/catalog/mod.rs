//! Format catalog
//!
//! Turns yt-dlp's raw, heterogeneous format list into the deduplicated and
//! ordered list of download options shown to the user:
//!
//! 1. an mp3 extraction option is always offered first,
//! 2. only http/https formats with an id and extension are considered,
//! 3. mp4 video is bucketed into allow-listed resolution tiers,
//! 4. silent video tiers are paired with the best m4a stream,
//! 5. the result is deduplicated by id and sorted for display.
//!
//! The output depends only on the input, so the same `VideoInfo` always
//! yields the same catalog.

pub mod labels;
pub mod thumbnails;
pub mod tier;

pub use thumbnails::{thumbnail_catalog, ThumbnailCatalog, ThumbnailOption, ThumbnailQuality};
pub use tier::ResolutionTier;

use crate::extractor::models::{RawFormat, VideoInfo};
use labels::{bitrate_label, label_bitrate, size_label, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tier::label_height;
use tracing::debug;

/// Id of the synthetic "extract audio to mp3" option
pub const MP3_ID: &str = "mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    AudioOnly,
    VideoOnly,
    AudioVideoPremuxed,
    AudioVideoMuxedSynthetic,
}

impl EntryKind {
    /// Picture and sound in one download
    pub fn is_combined(self) -> bool {
        matches!(
            self,
            EntryKind::AudioVideoPremuxed | EntryKind::AudioVideoMuxedSynthetic
        )
    }
}

/// One user-facing download option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// yt-dlp format id, `mp3`, or `<video>+<audio>`
    pub id: String,
    pub category: Category,
    pub kind: EntryKind,
    pub label: String,
    pub container: String,
    pub resolution_or_bitrate_label: String,
    pub approx_size_label: String,
    pub has_audio: bool,
    pub has_video: bool,
}

impl CatalogEntry {
    pub fn mp3() -> Self {
        Self {
            id: MP3_ID.to_string(),
            category: Category::Audio,
            kind: EntryKind::AudioOnly,
            label: "MP3 Audio".to_string(),
            container: "mp3".to_string(),
            resolution_or_bitrate_label: "Best Available".to_string(),
            // Unknown until yt-dlp has converted it
            approx_size_label: NOT_AVAILABLE.to_string(),
            has_audio: true,
            has_video: false,
        }
    }

    fn audio_only(format: &RawFormat, id: &str, ext: &str) -> Self {
        Self {
            id: id.to_string(),
            category: Category::Audio,
            kind: EntryKind::AudioOnly,
            label: format!("{} Audio", ext.to_uppercase()),
            container: ext.to_string(),
            resolution_or_bitrate_label: bitrate_label(format.bitrate()),
            approx_size_label: size_label(format.file_size_bytes()),
            has_audio: true,
            has_video: false,
        }
    }

    fn premuxed(format: &RawFormat, id: &str, tier: ResolutionTier) -> Self {
        Self {
            id: id.to_string(),
            category: Category::Video,
            kind: EntryKind::AudioVideoPremuxed,
            label: format!("MP4 {}", tier),
            container: "mp4".to_string(),
            resolution_or_bitrate_label: tier.label().to_string(),
            approx_size_label: size_label(format.file_size_bytes()),
            has_audio: true,
            has_video: true,
        }
    }

    fn video_only(format: &RawFormat, id: &str, tier: ResolutionTier) -> Self {
        Self {
            id: id.to_string(),
            category: Category::Video,
            kind: EntryKind::VideoOnly,
            label: format!("MP4 {} (Video Only)", tier),
            container: "mp4".to_string(),
            resolution_or_bitrate_label: tier.label().to_string(),
            approx_size_label: size_label(format.file_size_bytes()),
            has_audio: false,
            has_video: true,
        }
    }

    fn muxed(video: &Usable<'_>, audio: &Usable<'_>, tier: ResolutionTier) -> Self {
        let combined = match (video.format.file_size_bytes(), audio.format.file_size_bytes()) {
            (Some(v), Some(a)) => Some(v.saturating_add(a)),
            _ => None,
        };

        Self {
            id: format!("{}+{}", video.id, audio.id),
            category: Category::Video,
            kind: EntryKind::AudioVideoMuxedSynthetic,
            label: format!("MP4 {} (Best Audio)", tier),
            container: "mp4".to_string(),
            resolution_or_bitrate_label: tier.label().to_string(),
            approx_size_label: size_label(combined),
            has_audio: true,
            has_video: true,
        }
    }
}

/// Top-level answer for `getVideoInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail_url: String,
    pub duration_label: String,
    pub formats: Vec<CatalogEntry>,
}

pub fn build_metadata(info: &VideoInfo) -> VideoMetadata {
    VideoMetadata {
        title: info.title.clone(),
        thumbnail_url: info.primary_thumbnail().unwrap_or_default().to_string(),
        duration_label: info.duration_label(),
        formats: normalize(info),
    }
}

/// A raw format that passed the protocol/id/extension filter
struct Usable<'a> {
    id: &'a str,
    ext: &'a str,
    format: &'a RawFormat,
}

impl<'a> Usable<'a> {
    fn new(format: &'a RawFormat) -> Option<Self> {
        if !format.is_http() {
            return None;
        }
        Some(Self {
            id: format.id()?,
            ext: format.extension()?,
            format,
        })
    }

    fn is_m4a_audio(&self) -> bool {
        self.ext == "m4a" && !self.format.has_video() && self.format.has_audio()
    }

    fn is_mp4_video(&self) -> bool {
        self.ext == "mp4" && self.format.has_video()
    }

    fn bitrate(&self) -> f64 {
        self.format.bitrate().unwrap_or(0.0)
    }

    fn size(&self) -> u64 {
        self.format.file_size_bytes().unwrap_or(0)
    }
}

/// Resolution tier from `format_note` ("1080p60"), then `resolution`, then exact height
pub fn tier_of(format: &RawFormat) -> Option<ResolutionTier> {
    format
        .format_note
        .as_deref()
        .and_then(ResolutionTier::from_label)
        .or_else(|| format.resolution.as_deref().and_then(ResolutionTier::from_resolution))
        .or_else(|| format.height.and_then(ResolutionTier::from_height))
}

/// Build the display catalog for one video
pub fn normalize(info: &VideoInfo) -> Vec<CatalogEntry> {
    let mut entries = vec![CatalogEntry::mp3()];
    let mut premuxed_tiers: HashSet<ResolutionTier> = HashSet::new();
    // Largest silent mp4 per tier, in first-seen tier order
    let mut mux_video: Vec<(ResolutionTier, Usable<'_>)> = Vec::new();
    let mut best_audio: Option<Usable<'_>> = None;

    for candidate in info.formats.iter().filter_map(Usable::new) {
        if candidate.is_m4a_audio() {
            entries.push(CatalogEntry::audio_only(
                candidate.format,
                candidate.id,
                candidate.ext,
            ));
            if best_audio
                .as_ref()
                .map_or(true, |best| candidate.bitrate() > best.bitrate())
            {
                best_audio = Some(candidate);
            }
            continue;
        }

        if !candidate.is_mp4_video() {
            continue;
        }
        let Some(tier) = tier_of(candidate.format) else {
            continue;
        };

        if candidate.format.has_audio() {
            // First premuxed stream at a tier wins
            if premuxed_tiers.insert(tier) {
                entries.push(CatalogEntry::premuxed(candidate.format, candidate.id, tier));
            }
            continue;
        }

        entries.push(CatalogEntry::video_only(candidate.format, candidate.id, tier));
        match mux_video.iter_mut().find(|(t, _)| *t == tier) {
            Some((_, kept)) => {
                if candidate.size() > kept.size() {
                    *kept = candidate;
                }
            }
            None => mux_video.push((tier, candidate)),
        }
    }

    if let Some(audio) = &best_audio {
        for (tier, video) in &mux_video {
            if premuxed_tiers.contains(tier) {
                continue;
            }
            entries.push(CatalogEntry::muxed(video, audio, *tier));
        }
    }

    let mut catalog = dedup_by_id(entries);
    catalog.sort_by(display_order);

    debug!(
        "{}: {} raw formats -> {} catalog entries",
        info.id,
        info.formats.len(),
        catalog.len()
    );
    catalog
}

/// Keep the first entry for every id, preserving order
pub fn dedup_by_id(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}

/// Audio before video; video by height then combined first; audio with mp3
/// first then by bitrate
pub fn display_order(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.category.cmp(&b.category).then_with(|| match a.category {
        Category::Video => label_height(&b.resolution_or_bitrate_label)
            .cmp(&label_height(&a.resolution_or_bitrate_label))
            .then_with(|| b.kind.is_combined().cmp(&a.kind.is_combined())),
        Category::Audio => (b.id == MP3_ID)
            .cmp(&(a.id == MP3_ID))
            .then_with(|| {
                label_bitrate(&b.resolution_or_bitrate_label)
                    .cmp(&label_bitrate(&a.resolution_or_bitrate_label))
            }),
    })
}
