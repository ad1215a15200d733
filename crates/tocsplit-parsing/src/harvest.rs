use tocsplit_core::DocumentSource;

use crate::ParsingError;

/// Inclusive, 1-indexed physical page range holding the table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocRange {
    pub start: usize,
    pub end: usize,
}

impl TocRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check the range against the document and clamp `end` to the last page.
    ///
    /// Returns the effective range and whether clamping happened. A zero
    /// start, a start after the end, or a start beyond the document is a
    /// configuration error.
    pub fn resolve(&self, page_count: usize) -> Result<(TocRange, bool), ParsingError> {
        let fail = |reason: String| ParsingError::Configuration {
            start: self.start,
            end: self.end,
            reason,
        };

        if self.start == 0 {
            return Err(fail("pages are 1-indexed".to_string()));
        }
        if self.start > self.end {
            return Err(fail("start is after end".to_string()));
        }
        if self.start > page_count {
            return Err(fail(format!(
                "document has only {page_count} pages"
            )));
        }

        if self.end > page_count {
            Ok((TocRange::new(self.start, page_count), true))
        } else {
            Ok((*self, false))
        }
    }
}

/// Raw TOC text gathered from the configured pages.
#[derive(Debug, Clone)]
pub struct TocText {
    /// Page texts in page order, each preceded by a `--- File Page N ---` marker.
    pub text: String,
    /// The range actually read (after clamping).
    pub range: TocRange,
    /// Whether the configured end page was beyond the document.
    pub clamped: bool,
}

/// Marker line written before each page's text.
pub fn page_marker(page: usize) -> String {
    format!("--- File Page {page} ---")
}

/// Concatenate the text of the TOC pages.
///
/// Pages without text are skipped. The end of the range is clamped to the
/// document with a warning; see [`TocRange::resolve`] for the fatal cases.
pub fn harvest_toc(doc: &dyn DocumentSource, range: TocRange) -> Result<TocText, ParsingError> {
    let (effective, clamped) = range.resolve(doc.page_count())?;
    if clamped {
        tracing::warn!(
            requested_end = range.end,
            page_count = doc.page_count(),
            "TOC range extends past the document, clamping"
        );
    }

    let mut parts = Vec::new();
    for page in effective.start..=effective.end {
        let text = doc.page_text(page)?;
        if text.trim().is_empty() {
            tracing::debug!(page, "TOC page has no text");
            continue;
        }
        parts.push(format!("{}\n{}", page_marker(page), text.trim_end()));
    }

    let text = parts.join("\n");
    tracing::info!(
        first = effective.start,
        last = effective.end,
        chars = text.len(),
        "harvested TOC text"
    );

    Ok(TocText {
        text,
        range: effective,
        clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tocsplit_core::mock::MockDocument;

    fn doc() -> MockDocument {
        MockDocument::new()
            .page("Cover")
            .page("Contents\n1 Introduction 5")
            .page("2 Methods 12\n3 Results 20")
            .page("")
            .page("Body")
    }

    #[test]
    fn harvests_pages_in_order_with_markers() {
        let toc = harvest_toc(&doc(), TocRange::new(2, 3)).unwrap();
        assert_eq!(
            toc.text,
            "--- File Page 2 ---\nContents\n1 Introduction 5\n--- File Page 3 ---\n2 Methods 12\n3 Results 20"
        );
        assert!(!toc.clamped);
    }

    #[test]
    fn single_page_range() {
        let toc = harvest_toc(&doc(), TocRange::new(3, 3)).unwrap();
        assert!(toc.text.contains("2 Methods 12"));
        assert!(!toc.text.contains("Introduction"));
        assert_eq!(toc.range, TocRange::new(3, 3));
    }

    #[test]
    fn empty_pages_are_skipped() {
        let toc = harvest_toc(&doc(), TocRange::new(3, 4)).unwrap();
        assert!(!toc.text.contains("File Page 4"));
    }

    #[test]
    fn end_past_document_is_clamped() {
        let toc = harvest_toc(&doc(), TocRange::new(4, 9)).unwrap();
        assert!(toc.clamped);
        assert_eq!(toc.range, TocRange::new(4, 5));
        assert!(toc.text.contains("Body"));
    }

    #[test]
    fn range_entirely_out_of_bounds_is_error() {
        let err = harvest_toc(&doc(), TocRange::new(7, 9)).unwrap_err();
        assert!(matches!(err, ParsingError::Configuration { start: 7, .. }));
    }

    #[test]
    fn inverted_and_zero_ranges_are_errors() {
        assert!(TocRange::new(4, 2).resolve(10).is_err());
        assert!(TocRange::new(0, 2).resolve(10).is_err());
    }
}
