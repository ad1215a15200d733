use std::path::Path;

use mupdf::{Document, Page, TextPage, TextPageFlags};

use tocsplit_core::backend::check_page;
use tocsplit_core::{BackendError, DocumentSource, TextSpan};

/// Two characters belong to the same span when their sizes differ by less than this.
const SIZE_TOLERANCE: f32 = 0.01;

/// MuPDF-based implementation of [`DocumentSource`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the workspace does not
/// transitively depend on it.
///
/// Unlike typical body-text extraction, running headers and footers are kept:
/// the printed page number usually lives in one of them and the offset
/// resolver needs it.
pub struct MupdfDocument {
    document: Document,
    page_count: usize,
}

impl MupdfDocument {
    /// Open `path` and read its page count.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = usize::try_from(page_count).unwrap_or(0);

        tracing::debug!(path = %path.display(), page_count, "opened document");
        Ok(Self {
            document,
            page_count,
        })
    }

    fn text_page(&self, page: usize) -> Result<TextPage, BackendError> {
        check_page(page, self.page_count)?;
        let index = i32::try_from(page - 1).map_err(|_| BackendError::PageOutOfRange {
            page,
            page_count: self.page_count,
        })?;
        let page: Page = self
            .document
            .load_page(index)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        page.to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))
    }
}

impl DocumentSource for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, page: usize) -> Result<String, BackendError> {
        let text_page = self.text_page(page)?;

        // Block/line iteration keeps the reading order of the page
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }

    fn page_spans(&self, page: usize) -> Result<Vec<TextSpan>, BackendError> {
        let text_page = self.text_page(page)?;

        let mut spans = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                spans.extend(group_spans(
                    line.chars()
                        .map(|c| (c.char().unwrap_or('\u{FFFD}'), c.size())),
                ));
            }
        }
        Ok(spans)
    }
}

/// Split one line's characters into runs of equal font size.
///
/// Whitespace joins the current run whatever its size. Runs are trimmed and
/// empty runs dropped.
pub fn group_spans(chars: impl IntoIterator<Item = (char, f32)>) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut current: Option<TextSpan> = None;

    for (ch, size) in chars {
        match current.as_mut() {
            Some(span) if ch.is_whitespace() || (span.font_size - size).abs() < SIZE_TOLERANCE => {
                span.text.push(ch);
            }
            _ => {
                if ch.is_whitespace() {
                    continue;
                }
                if let Some(done) = current.take() {
                    spans.push(done);
                }
                current = Some(TextSpan::new(ch.to_string(), size));
            }
        }
    }
    if let Some(done) = current {
        spans.push(done);
    }

    spans
        .into_iter()
        .filter_map(|mut span| {
            let trimmed = span.text.trim();
            if trimmed.is_empty() {
                return None;
            }
            span.text = trimmed.to_string();
            Some(span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str, size: f32) -> Vec<(char, f32)> {
        text.chars().map(|c| (c, size)).collect()
    }

    #[test]
    fn uniform_line_is_one_span() {
        let spans = group_spans(chars("Chapter One", 24.0));
        assert_eq!(spans, vec![TextSpan::new("Chapter One", 24.0)]);
    }

    #[test]
    fn size_change_starts_new_span() {
        let mut line = chars("1 ", 24.0);
        line.extend(chars("Introduction", 18.0));
        line.extend(chars("  5", 10.0));
        let spans = group_spans(line);
        assert_eq!(
            spans,
            vec![
                TextSpan::new("1", 24.0),
                TextSpan::new("Introduction", 18.0),
                TextSpan::new("5", 10.0),
            ]
        );
    }

    #[test]
    fn whitespace_size_does_not_split() {
        let mut line = chars("Error", 12.0);
        line.push((' ', 9.0));
        line.extend(chars("Handling", 12.0));
        assert_eq!(group_spans(line), vec![TextSpan::new("Error Handling", 12.0)]);
    }

    #[test]
    fn blank_line_has_no_spans() {
        assert!(group_spans(chars("   ", 10.0)).is_empty());
    }

    #[test]
    fn missing_file_is_open_error() {
        let result = MupdfDocument::open(Path::new("/nonexistent/book.pdf"));
        assert!(matches!(result, Err(BackendError::OpenError(_))));
    }
}
