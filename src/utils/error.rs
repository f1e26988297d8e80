//! Error handling for Tubefetch

use crate::extractor::parser::ParseError;
use crate::validator::ValidationError;
use thiserror::Error;

/// Main error type for Tubefetch
#[derive(Debug, Error)]
pub enum TubefetchError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to run yt-dlp: {0}")]
    Process(#[from] std::io::Error),

    #[error("yt-dlp produced no output")]
    EmptyOutput,

    #[error("yt-dlp reported an error: {0}")]
    ToolReported(String),

    #[error("yt-dlp did not finish within {0} seconds")]
    Timeout(u64),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid format ID: {0}")]
    InvalidFormatSelector(String),
}

impl TubefetchError {
    /// True for errors caused by the request itself rather than by yt-dlp or the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TubefetchError::Validation(_) | TubefetchError::InvalidFormatSelector(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TubefetchError>;
