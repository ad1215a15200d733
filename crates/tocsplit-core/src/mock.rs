//! In-memory document for testing.

use std::cell::Cell;
use std::collections::HashSet;

use crate::backend::{BackendError, DocumentSource, check_page};
use crate::TextSpan;

/// Font size used for body text in [`MockDocument`] pages.
pub const BODY_SIZE: f32 = 10.0;
/// Font size used for headings in [`MockDocument`] pages.
pub const HEADING_SIZE: f32 = 24.0;

#[derive(Debug, Clone, Default)]
struct MockPage {
    spans: Vec<TextSpan>,
}

impl MockPage {
    fn text(&self) -> String {
        let mut text = String::new();
        for span in &self.spans {
            text.push_str(&span.text);
            text.push('\n');
        }
        text
    }
}

/// A hand-rolled [`DocumentSource`] for tests.
///
/// Supports:
/// - Plain body pages and pages with a large-font heading.
/// - Pages replaced by arbitrary span lists for heuristic edge cases.
/// - Pages that fail extraction.
/// - Counting span requests via [`span_calls()`](MockDocument::span_calls).
#[derive(Debug, Default)]
pub struct MockDocument {
    pages: Vec<MockPage>,
    failing: HashSet<usize>,
    span_calls: Cell<usize>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document of `count` pages, each holding only a footer with its own
    /// physical page number.
    pub fn blank(count: usize) -> Self {
        let mut doc = Self::new();
        for i in 1..=count {
            doc = doc.page(&format!("blank page\n{i}"));
        }
        doc
    }

    /// Append a page of body text; every line becomes one body-size span.
    pub fn page(mut self, body: &str) -> Self {
        let spans = body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| TextSpan::new(l, BODY_SIZE))
            .collect();
        self.pages.push(MockPage { spans });
        self
    }

    /// Append a page whose first span is `heading` at heading size.
    pub fn heading_page(mut self, heading: &str, body: &str) -> Self {
        let mut spans = vec![TextSpan::new(heading, HEADING_SIZE)];
        spans.extend(
            body.lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| TextSpan::new(l, BODY_SIZE)),
        );
        self.pages.push(MockPage { spans });
        self
    }

    /// Replace the page at 1-indexed `page` with explicit spans.
    pub fn set_spans_page(mut self, page: usize, spans: Vec<TextSpan>) -> Self {
        if let Some(slot) = self.pages.get_mut(page.wrapping_sub(1)) {
            *slot = MockPage { spans };
        }
        self
    }

    /// Replace the page at 1-indexed `page`.
    pub fn set_heading_page(mut self, page: usize, heading: &str, body: &str) -> Self {
        let replacement = Self::new().heading_page(heading, body);
        if let Some(slot) = self.pages.get_mut(page.wrapping_sub(1)) {
            *slot = replacement.pages.into_iter().next().unwrap_or_default();
        }
        self
    }

    /// Make extraction of the 1-indexed `page` fail.
    pub fn failing_page(mut self, page: usize) -> Self {
        self.failing.insert(page);
        self
    }

    /// Number of [`DocumentSource::page_spans`] calls so far.
    pub fn span_calls(&self) -> usize {
        self.span_calls.get()
    }

    fn get(&self, page: usize) -> Result<&MockPage, BackendError> {
        check_page(page, self.pages.len())?;
        if self.failing.contains(&page) {
            return Err(BackendError::ExtractionError(format!(
                "mock failure on page {page}"
            )));
        }
        Ok(&self.pages[page - 1])
    }
}

impl DocumentSource for MockDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String, BackendError> {
        Ok(self.get(page)?.text())
    }

    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>, BackendError> {
        self.span_calls.set(self.span_calls.get() + 1);
        Ok(self.get(page)?.spans.clone())
    }
}
