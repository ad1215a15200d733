use thiserror::Error;

use crate::TextSpan;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only access to an opened document.
///
/// Implementors wrap a concrete PDF library; the pipeline (TOC harvesting,
/// offset resolution, range planning) only sees page text and font-size runs.
/// Page numbers are physical and 1-indexed.
pub trait DocumentSource {
    /// Number of physical pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of a page, lines separated by `\n`.
    fn page_text(&self, page: usize) -> Result<String, BackendError>;

    /// Text runs of a page in reading order, each annotated with its font size.
    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>, BackendError>;
}

/// Fail with [`BackendError::PageOutOfRange`] unless `page` is in `1..=page_count`.
pub fn check_page(page: usize, page_count: usize) -> Result<(), BackendError> {
    if page == 0 || page > page_count {
        return Err(BackendError::PageOutOfRange { page, page_count });
    }
    Ok(())
}
