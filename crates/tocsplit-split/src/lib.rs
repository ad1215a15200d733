use std::path::PathBuf;

use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
pub mod fixture;
pub mod metadata;
pub mod splitter;

pub use metadata::{DocumentMetadata, document_metadata};
pub use splitter::{ChapterFailure, PdfSplitter, SplitProgress, SplitReport, WrittenChapter};

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("failed to load PDF {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },
    #[error("pages {start}-{end} are outside the document ({page_count} pages)")]
    InvalidRange {
        start: usize,
        end: usize,
        page_count: usize,
    },
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
