pub mod command;
pub mod models;
pub mod parser;
pub mod process;
pub mod traits;
pub mod ytdlp;

pub use command::{CommandBuilder, CommandLine, Intent};
pub use models::{RawFormat, SearchResult, VideoInfo};
pub use parser::{parse_info, parse_search_lines, ParseError};
pub use process::{Classification, ExecResult, ProcessExecutor, ProcessStream};
pub use traits::{Extractor, MediaStream};
pub use ytdlp::YtDlpExtractor;
