use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod harvest;
pub mod toc;

pub use config::{ParsingConfig, ParsingConfigBuilder};
pub use extractor::TocExtractor;
pub use harvest::{TocRange, TocText, harvest_toc};
pub use toc::{ChapterList, EntryFlag, FilterStats, parse_chapter_list};
// Re-export domain types from core (canonical definitions live there)
pub use tocsplit_core::{BackendError, ChapterEntry, DocumentSource};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid TOC page range {start}-{end}: {reason}")]
    Configuration {
        start: usize,
        end: usize,
        reason: String,
    },
    #[error("no numbered chapter entries found in the table of contents")]
    NoChapters,
    #[error("invalid chapter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("chapter pattern is missing the `{0}` capture group")]
    MissingGroup(&'static str),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
