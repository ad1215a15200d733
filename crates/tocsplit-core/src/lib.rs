use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod filename;
pub mod matching;
pub mod mock;
pub mod offset;
pub mod ranges;

// Re-export for convenience
pub use backend::{BackendError, DocumentSource};
pub use filename::{chapter_file_name, sanitize_title, unique_file_names};
pub use offset::{
    FixedPage, HeadingHeuristic, ManualRequest, OperatorInput, ResolverConfig, resolve_offset,
};
pub use ranges::{ChapterRange, RangeError, RangeErrorKind, RangePlan, compute_ranges, split_points};

/// One numbered line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterEntry {
    /// Dot-separated chapter number without a trailing dot, e.g. `"2"` or `"2.1"`.
    pub number: String,
    pub title: String,
    /// Page number as typeset in the book (not the position in the file).
    pub printed_page: u32,
}

impl ChapterEntry {
    pub fn new(number: impl Into<String>, title: impl Into<String>, printed_page: u32) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            printed_page,
        }
    }

    /// Nesting level: `"3"` is 1, `"3.2"` is 2, `"3.2.1"` is 3.
    pub fn depth(&self) -> usize {
        self.number.split('.').filter(|p| !p.is_empty()).count()
    }

    /// `"<number> <title>"`, as the entry appears in the TOC.
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            self.number.clone()
        } else {
            format!("{} {}", self.number, self.title)
        }
    }
}

/// A run of text on one line rendered at a single font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// How the page offset was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OffsetMethod {
    /// The first chapter heading was found on `matched_page` by the font-size scan.
    Automatic { matched_page: usize },
    /// The operator supplied the physical page of the first chapter.
    Manual { provided_page: usize },
}

impl OffsetMethod {
    /// Physical page the offset was anchored on.
    pub fn anchor_page(&self) -> usize {
        match *self {
            OffsetMethod::Automatic { matched_page } => matched_page,
            OffsetMethod::Manual { provided_page } => provided_page,
        }
    }
}

/// Constant difference between physical and printed page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageOffset {
    pub value: i64,
    #[serde(flatten)]
    pub method: OffsetMethod,
}

impl PageOffset {
    /// Offset anchored on `physical_page` holding the chapter printed as `printed_page`.
    pub fn anchored(physical_page: usize, printed_page: u32, method: OffsetMethod) -> Self {
        Self {
            value: physical_page as i64 - i64::from(printed_page),
            method,
        }
    }

    /// `printed_page + offset`. May be out of the document's bounds.
    pub fn physical(&self, printed_page: u32) -> i64 {
        i64::from(printed_page) + self.value
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("operator input failed: {0}")]
    OperatorInput(String),
    #[error("page {page} is not a valid physical page (document has {page_count} pages)")]
    InvalidManualPage { page: usize, page_count: usize },
}
