//! Tubefetch - yt-dlp web front end
//!
//! Serves the JSON API, the download endpoint and a health check. yt-dlp
//! must be installed; it is located on PATH unless configured explicitly.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tubefetch::server;
use tubefetch::utils::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "tubefetch", version, about = "Web front end for yt-dlp")]
struct Args {
    /// JSON settings file (defaults to <config dir>/tubefetch/config.json)
    #[arg(long, env = "TUBEFETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubefetch=info,tower_http=info")),
        )
        .init();

    let mut settings = AppSettings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(path) = args.ytdlp {
        settings.ytdlp_path = Some(path);
    }
    debug!("Settings: {:?}", settings);

    info!("Starting tubefetch {}", env!("CARGO_PKG_VERSION"));
    server::serve(settings).await
}
