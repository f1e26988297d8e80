//! Resolution tiers

use std::fmt;

/// A resolution bucket that may appear in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolutionTier {
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
}

impl ResolutionTier {
    /// Allow-listed tiers, highest first
    pub const ALL: [ResolutionTier; 6] = [
        ResolutionTier::P2160,
        ResolutionTier::P1440,
        ResolutionTier::P1080,
        ResolutionTier::P720,
        ResolutionTier::P480,
        ResolutionTier::P360,
    ];

    pub fn height(self) -> u32 {
        match self {
            ResolutionTier::P360 => 360,
            ResolutionTier::P480 => 480,
            ResolutionTier::P720 => 720,
            ResolutionTier::P1080 => 1080,
            ResolutionTier::P1440 => 1440,
            ResolutionTier::P2160 => 2160,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResolutionTier::P360 => "360p",
            ResolutionTier::P480 => "480p",
            ResolutionTier::P720 => "720p",
            ResolutionTier::P1080 => "1080p",
            ResolutionTier::P1440 => "1440p",
            ResolutionTier::P2160 => "2160p",
        }
    }

    pub fn from_height(height: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.height() == height)
    }

    /// Parse a leading `<digits>p`, e.g. "720p", "1080p60", "1440p HDR"
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() || !label[digits.len()..].starts_with('p') {
            return None;
        }
        digits.parse().ok().and_then(Self::from_height)
    }

    /// Parse yt-dlp's `resolution` field: "1920x1080", or a label like "720p"
    pub fn from_resolution(resolution: &str) -> Option<Self> {
        let resolution = resolution.trim();
        match resolution.split_once('x') {
            Some((width, height)) if width.parse::<u32>().is_ok() => {
                height.trim().parse().ok().and_then(Self::from_height)
            }
            _ => Self::from_label(resolution),
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Height encoded in a display label such as "1080p"; 0 when there is none
pub fn label_height(label: &str) -> u32 {
    let Some(p) = label.find('p') else {
        return 0;
    };
    let digits: String = label[..p]
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(ResolutionTier::from_label("720p"), Some(ResolutionTier::P720));
        assert_eq!(ResolutionTier::from_label("1080p60"), Some(ResolutionTier::P1080));
        assert_eq!(ResolutionTier::from_label("2160p HDR"), Some(ResolutionTier::P2160));
        assert_eq!(ResolutionTier::from_label("240p"), None);
        assert_eq!(ResolutionTier::from_label("4320p"), None);
        assert_eq!(ResolutionTier::from_label("medium"), None);
        assert_eq!(ResolutionTier::from_label("1280x720"), None);
        assert_eq!(ResolutionTier::from_label(""), None);
    }

    #[test]
    fn test_from_resolution() {
        assert_eq!(ResolutionTier::from_resolution("1920x1080"), Some(ResolutionTier::P1080));
        assert_eq!(ResolutionTier::from_resolution("640x360"), Some(ResolutionTier::P360));
        assert_eq!(ResolutionTier::from_resolution("720p"), Some(ResolutionTier::P720));
        assert_eq!(ResolutionTier::from_resolution("256x144"), None);
        assert_eq!(ResolutionTier::from_resolution("audio only"), None);
        assert_eq!(ResolutionTier::from_resolution("x1080"), None);
    }

    #[test]
    fn test_from_height() {
        assert_eq!(ResolutionTier::from_height(1440), Some(ResolutionTier::P1440));
        assert_eq!(ResolutionTier::from_height(1088), None);
    }

    #[test]
    fn test_label_height() {
        assert_eq!(label_height("1080p"), 1080);
        assert_eq!(label_height("MP4 720p"), 720);
        assert_eq!(label_height("Best Available"), 0);
        assert_eq!(label_height("128kbps"), 0);
    }

    #[test]
    fn test_all_is_descending() {
        let heights: Vec<u32> = ResolutionTier::ALL.iter().map(|t| t.height()).collect();
        let mut sorted = heights.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(heights, sorted);
    }
}
