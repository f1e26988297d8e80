//! Error handling and configuration

pub mod config;
pub mod error;

pub use config::{default_config_path, AppSettings, MAX_SEARCH_LIMIT};
pub use error::{Result, TubefetchError};
