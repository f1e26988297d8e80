//! yt-dlp backed extractor
//!
//! Glues the command builder, the process executor and the JSON parser
//! together. Every call spawns a fresh yt-dlp process; nothing is cached
//! between requests.

use crate::extractor::command::{CommandBuilder, Intent};
use crate::extractor::models::{SearchResult, VideoInfo};
use crate::extractor::parser::{parse_info, parse_search_lines};
use crate::extractor::process::{locate_ytdlp, Classification, ProcessExecutor};
use crate::extractor::traits::{Extractor, MediaStream};
use crate::streaming::FormatSelector;
use crate::utils::error::Result;
use crate::utils::AppSettings;
use crate::validator::{ValidQuery, ValidUrl};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

/// Main video extractor using yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    commands: CommandBuilder,
    executor: ProcessExecutor,
}

impl YtDlpExtractor {
    /// Locate yt-dlp (configured path, PATH, common locations) and build the extractor
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let path = locate_ytdlp(settings.ytdlp_path.as_deref())?;
        info!("Found yt-dlp at: {}", path.display());
        Ok(Self::with_program(path, settings))
    }

    /// Build around a known executable without probing the filesystem
    pub fn with_program(program: impl AsRef<Path>, settings: &AppSettings) -> Self {
        Self {
            commands: CommandBuilder::new(program.as_ref(), settings),
            executor: ProcessExecutor::new(settings),
        }
    }

    pub fn ytdlp_path(&self) -> &Path {
        self.commands.program()
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    async fn fetch_info(&self, url: &ValidUrl) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);

        let cmd = self.commands.build(&Intent::FetchInfoNoPlaylist {
            url: url.as_str().to_string(),
        });
        let payload = self.executor.execute(&cmd).await?.into_payload()?;
        let info = parse_info(&payload)?;

        debug!("{}: {} raw formats", info.id, info.formats.len());
        Ok(info)
    }

    async fn search(&self, query: &ValidQuery, limit: usize) -> Result<Vec<SearchResult>> {
        debug!("Searching for: {} (count: {})", query.as_str(), limit);

        let cmd = self.commands.build(&Intent::Search {
            query: query.as_str().to_string(),
            limit,
        });
        let result = self.executor.execute(&cmd).await?;
        if result.classification == Classification::EmptyOutput {
            warn!("yt-dlp returned empty output for query: {}", query.as_str());
            return Ok(Vec::new());
        }

        let payload = result.into_payload()?;
        Ok(parse_search_lines(&payload).collect())
    }

    async fn open_stream(&self, url: &ValidUrl, selector: &FormatSelector) -> Result<MediaStream> {
        let cmd = self.commands.build(&Intent::StreamFormat {
            url: url.as_str().to_string(),
            selector: selector.as_str().to_string(),
        });
        let stream = self.executor.spawn_stream(&cmd)?;
        info!("Streaming {} as {:?} (pid {:?})", url, selector, stream.id());
        Ok(Box::pin(stream))
    }
}
