//! Human readable labels for catalog entries

/// Placeholder for anything unknown
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a byte count in decimal units ("12.34 MB")
pub fn human_size(bytes: u64) -> String {
    let size = bytes as f64;

    if size >= 1_000_000_000.0 {
        format!("{:.2} GB", size / 1_000_000_000.0)
    } else if size >= 1_000_000.0 {
        format!("{:.2} MB", size / 1_000_000.0)
    } else if size >= 1_000.0 {
        format!("{:.2} KB", size / 1_000.0)
    } else {
        format!("{} bytes", bytes)
    }
}

pub fn size_label(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => human_size(b),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// "128kbps", or "N/A" without a usable bitrate
pub fn bitrate_label(kbps: Option<f64>) -> String {
    match kbps {
        Some(k) if k.is_finite() && k > 0.0 => format!("{}kbps", k.round() as u64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Inverse of [`bitrate_label`]; 0 when the label carries no number
pub fn label_bitrate(label: &str) -> u64 {
    label
        .strip_suffix("kbps")
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}
