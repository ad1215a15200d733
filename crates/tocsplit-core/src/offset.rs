//! Printed-to-physical page offset resolution.
//!
//! Front matter (cover, preface, roman-numbered pages) shifts the page numbers
//! typeset in the book against the page positions in the file. The shift is
//! found by locating the first chapter's heading: a page where the chapter
//! title is set in the page's largest font and the printed page number appears
//! as a token. When no page qualifies, an [`OperatorInput`] supplies the
//! physical page instead.

use std::collections::HashMap;

use crate::backend::DocumentSource;
use crate::matching::{contains_page_token, heading_matches, search_key};
use crate::{ChapterEntry, CoreError, OffsetMethod, PageOffset, TextSpan};

/// How large-font spans are picked out of a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingHeuristic {
    /// Spans within `epsilon` points of the page's largest font size, when
    /// that size stands more than `epsilon` above the most common one.
    NearMax { epsilon: f32 },
    /// Spans at least `ratio` times the page's most common font size.
    BaselineRatio { ratio: f32 },
}

impl Default for HeadingHeuristic {
    fn default() -> Self {
        HeadingHeuristic::NearMax { epsilon: 0.5 }
    }
}

/// Tunables for the heading scan.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub heuristic: HeadingHeuristic,
    /// Maximum number of pages scanned after the TOC.
    pub scan_window: usize,
    /// Minimum rapidfuzz ratio (0.0-1.0) for a non-verbatim heading match.
    pub fuzzy_threshold: f64,
    /// Number of leading title words used as the search key.
    pub search_words: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            heuristic: HeadingHeuristic::default(),
            scan_window: 50,
            fuzzy_threshold: 0.9,
            search_words: 5,
        }
    }
}

/// What the operator is asked for when the scan is inconclusive.
#[derive(Debug, Clone, Copy)]
pub struct ManualRequest<'a> {
    pub entry: &'a ChapterEntry,
    pub page_count: usize,
}

/// Source of the manual fallback answer: the physical page (1-indexed) on
/// which the first chapter starts.
pub trait OperatorInput {
    fn first_chapter_page(&mut self, request: &ManualRequest<'_>) -> Result<usize, CoreError>;
}

/// [`OperatorInput`] that always answers with the same page.
#[derive(Debug, Clone, Copy)]
pub struct FixedPage(pub usize);

impl OperatorInput for FixedPage {
    fn first_chapter_page(&mut self, _request: &ManualRequest<'_>) -> Result<usize, CoreError> {
        Ok(self.0)
    }
}

/// Pick out the large-font text of a page and join consecutive large spans
/// into heading blocks.
pub fn heading_blocks(spans: &[TextSpan], heuristic: HeadingHeuristic) -> Vec<String> {
    let sized: Vec<&TextSpan> = spans
        .iter()
        .filter(|s| !s.text.trim().is_empty() && s.font_size > 0.0)
        .collect();
    if sized.is_empty() {
        return Vec::new();
    }

    let threshold = match heuristic {
        HeadingHeuristic::NearMax { epsilon } => {
            let max = sized.iter().map(|s| s.font_size).fold(f32::MIN, f32::max);
            // A page whose largest text is its body text has no heading
            if max - baseline_size(&sized) <= epsilon.abs() {
                return Vec::new();
            }
            max - epsilon.abs()
        }
        HeadingHeuristic::BaselineRatio { ratio } => baseline_size(&sized) * ratio,
    };

    let mut blocks = Vec::new();
    let mut current = String::new();
    for span in sized {
        if span.font_size >= threshold {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(span.text.trim());
        } else if !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Most common font size rounded to 0.1pt; ties go to the smaller size.
fn baseline_size(spans: &[&TextSpan]) -> f32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for span in spans {
        *counts.entry((span.font_size * 10.0).round() as i32).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(size_a, n_a), (size_b, n_b)| n_a.cmp(n_b).then(size_b.cmp(size_a)))
        .map(|(size, _)| size as f32 / 10.0)
        .unwrap_or(0.0)
}

/// Scan pages `scan_start..` for the heading of `entry`.
///
/// Returns the offset anchored on the first page where the title appears in
/// large-font text and the printed page number appears in the page text.
/// Pages that fail extraction are logged and skipped. `None` means the scan
/// was inconclusive.
pub fn scan_for_offset(
    doc: &dyn DocumentSource,
    entry: &ChapterEntry,
    scan_start: usize,
    config: &ResolverConfig,
) -> Option<PageOffset> {
    let key = search_key(&entry.title, config.search_words);
    if key.is_empty() {
        tracing::warn!(chapter = %entry.label(), "chapter title is empty after cleanup, cannot scan");
        return None;
    }

    let page_count = doc.page_count();
    let first = scan_start.max(1);
    let last = first
        .saturating_add(config.scan_window)
        .saturating_sub(1)
        .min(page_count);

    tracing::info!(
        key = %key,
        printed_page = entry.printed_page,
        first,
        last,
        "scanning for first chapter heading"
    );

    for page in first..=last {
        let spans = match doc.page_spans(page) {
            Ok(spans) => spans,
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping page during heading scan");
                continue;
            }
        };

        let blocks = heading_blocks(&spans, config.heuristic);
        let title_found = blocks
            .iter()
            .any(|b| heading_matches(b, &key, config.fuzzy_threshold));
        if !title_found {
            tracing::trace!(page, blocks = blocks.len(), "no heading match");
            continue;
        }

        let text = match doc.page_text(page) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping page during heading scan");
                continue;
            }
        };

        if contains_page_token(&text, entry.printed_page) {
            tracing::info!(page, "found first chapter heading and printed page number");
            return Some(PageOffset::anchored(
                page,
                entry.printed_page,
                OffsetMethod::Automatic { matched_page: page },
            ));
        }

        tracing::debug!(
            page,
            printed_page = entry.printed_page,
            "heading found but printed page number missing, continuing"
        );
    }

    None
}

/// Offset from an operator-provided physical page of the first chapter.
pub fn manual_offset(
    entry: &ChapterEntry,
    provided_page: usize,
    page_count: usize,
) -> Result<PageOffset, CoreError> {
    if provided_page == 0 || provided_page > page_count {
        return Err(CoreError::InvalidManualPage {
            page: provided_page,
            page_count,
        });
    }
    Ok(PageOffset::anchored(
        provided_page,
        entry.printed_page,
        OffsetMethod::Manual { provided_page },
    ))
}

/// Resolve the page offset for `entry` (the first split-point chapter).
///
/// Scans from the page after `toc_end`; when the scan is inconclusive the
/// `operator` is asked for the physical page of the chapter start.
pub fn resolve_offset(
    doc: &dyn DocumentSource,
    entry: &ChapterEntry,
    toc_end: usize,
    config: &ResolverConfig,
    operator: &mut dyn OperatorInput,
) -> Result<PageOffset, CoreError> {
    if let Some(offset) = scan_for_offset(doc, entry, toc_end + 1, config) {
        return Ok(offset);
    }

    tracing::warn!(
        chapter = %entry.label(),
        window = config.scan_window,
        "heading scan inconclusive, asking operator for the first chapter page"
    );

    let request = ManualRequest {
        entry,
        page_count: doc.page_count(),
    };
    let provided = operator.first_chapter_page(&request)?;
    manual_offset(entry, provided, doc.page_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDocument;

    /// Operator that fails the test if consulted.
    struct NoOperator;

    impl OperatorInput for NoOperator {
        fn first_chapter_page(&mut self, _: &ManualRequest<'_>) -> Result<usize, CoreError> {
            panic!("operator should not be consulted");
        }
    }

    fn intro() -> ChapterEntry {
        ChapterEntry::new("1", "Introduction", 5)
    }

    /// 10 pages; TOC on 2-3; chapter 1 heading on physical page 7, printed 5.
    fn book() -> MockDocument {
        MockDocument::blank(10)
            .set_heading_page(2, "Contents", "1 Introduction 5\n2 Methods 12")
            .set_heading_page(7, "Introduction", "Some opening text.\n5")
    }

    #[test]
    fn automatic_scan_finds_heading_page() {
        let doc = book();
        let offset =
            resolve_offset(&doc, &intro(), 3, &ResolverConfig::default(), &mut NoOperator)
                .unwrap();
        assert_eq!(offset.value, 2);
        assert_eq!(offset.method, OffsetMethod::Automatic { matched_page: 7 });
        assert_eq!(offset.physical(5), 7);
    }

    #[test]
    fn scan_starts_after_toc() {
        // The TOC page itself carries the title in its large font.
        let doc = MockDocument::blank(10)
            .set_heading_page(2, "1 Introduction 5", "")
            .set_heading_page(8, "Introduction", "5");
        let offset = scan_for_offset(&doc, &intro(), 3, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.method.anchor_page(), 8);
    }

    #[test]
    fn heading_without_page_number_is_skipped() {
        let doc = MockDocument::blank(10)
            .set_heading_page(5, "Introduction", "no number here")
            .set_heading_page(9, "Introduction", "5");
        let offset = scan_for_offset(&doc, &intro(), 4, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.value, 4);
    }

    #[test]
    fn first_match_wins() {
        let doc = MockDocument::blank(10)
            .set_heading_page(5, "Introduction", "5")
            .set_heading_page(9, "Introduction", "5");
        let offset = scan_for_offset(&doc, &intro(), 4, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.method.anchor_page(), 5);
        // Scanning stopped at the match.
        assert_eq!(doc.span_calls(), 2);
    }

    #[test]
    fn small_font_title_does_not_count() {
        let doc = MockDocument::blank(10)
            .set_heading_page(6, "Preface", "Introduction\n5");
        assert!(scan_for_offset(&doc, &intro(), 4, &ResolverConfig::default()).is_none());
    }

    #[test]
    fn single_font_cross_reference_does_not_anchor() {
        let doc = MockDocument::blank(10)
            .set_heading_page(7, "Introduction", "5")
            .set_spans_page(
                6,
                vec![
                    TextSpan::new("How to use this book", 10.0),
                    TextSpan::new("Chapter 1, Introduction, starts on page 5.", 10.0),
                    TextSpan::new("iv", 10.0),
                ],
            );
        let offset = scan_for_offset(&doc, &intro(), 3, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.method.anchor_page(), 7);
        assert_eq!(offset.value, 2);
    }

    #[test]
    fn numeric_title_is_still_scanned() {
        let entry = ChapterEntry::new("1", "1984", 5);
        let doc = MockDocument::blank(10).set_heading_page(7, "1984", "Part one\n5");
        let offset = scan_for_offset(&doc, &entry, 3, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.method.anchor_page(), 7);
    }

    #[test]
    fn near_max_with_uniform_page_has_no_headings() {
        let spans = vec![
            TextSpan::new("Introduction starts on page 5", 11.0),
            TextSpan::new("more prose", 11.0),
        ];
        assert!(heading_blocks(&spans, HeadingHeuristic::NearMax { epsilon: 0.5 }).is_empty());
    }

    #[test]
    fn scan_window_limits_search() {
        let doc = MockDocument::blank(20).set_heading_page(15, "Introduction", "5");
        let config = ResolverConfig {
            scan_window: 5,
            ..ResolverConfig::default()
        };
        assert!(scan_for_offset(&doc, &intro(), 4, &config).is_none());
        assert_eq!(doc.span_calls(), 5);
    }

    #[test]
    fn failing_page_is_skipped() {
        let doc = book().failing_page(5);
        let offset = scan_for_offset(&doc, &intro(), 4, &ResolverConfig::default()).unwrap();
        assert_eq!(offset.method.anchor_page(), 7);
    }

    #[test]
    fn manual_fallback_matches_automatic() {
        let doc = book();
        let automatic =
            resolve_offset(&doc, &intro(), 3, &ResolverConfig::default(), &mut NoOperator)
                .unwrap();

        // Same document with the heading removed forces the fallback.
        let plain = MockDocument::blank(10);
        let manual = resolve_offset(
            &plain,
            &intro(),
            3,
            &ResolverConfig::default(),
            &mut FixedPage(7),
        )
        .unwrap();

        assert_eq!(manual.value, automatic.value);
        assert_eq!(manual.method, OffsetMethod::Manual { provided_page: 7 });
    }

    #[test]
    fn manual_page_out_of_range_is_rejected() {
        let doc = MockDocument::blank(10);
        let err = resolve_offset(
            &doc,
            &intro(),
            3,
            &ResolverConfig::default(),
            &mut FixedPage(11),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidManualPage {
                page: 11,
                page_count: 10
            }
        ));
    }

    #[test]
    fn near_max_collects_consecutive_large_spans() {
        let spans = vec![
            TextSpan::new("Chapter 3", 20.0),
            TextSpan::new("Results and", 20.2),
            TextSpan::new("Discussion", 19.8),
            TextSpan::new("Body text", 10.0),
            TextSpan::new("Sidebar", 20.0),
            TextSpan::new("More body text", 10.0),
            TextSpan::new("Footer", 10.0),
        ];
        let blocks = heading_blocks(&spans, HeadingHeuristic::NearMax { epsilon: 0.5 });
        assert_eq!(blocks, vec!["Chapter 3 Results and Discussion", "Sidebar"]);
    }

    #[test]
    fn baseline_ratio_uses_most_common_size() {
        let spans = vec![
            TextSpan::new("Methods", 16.0),
            TextSpan::new("Section heading", 12.0),
            TextSpan::new("body", 10.0),
            TextSpan::new("body", 10.0),
            TextSpan::new("body", 10.0),
        ];
        let blocks = heading_blocks(&spans, HeadingHeuristic::BaselineRatio { ratio: 1.5 });
        assert_eq!(blocks, vec!["Methods"]);
    }

    #[test]
    fn baseline_ratio_with_uniform_page_has_no_headings() {
        let spans = vec![TextSpan::new("a", 10.0), TextSpan::new("b", 10.0)];
        assert!(heading_blocks(&spans, HeadingHeuristic::BaselineRatio { ratio: 1.5 }).is_empty());
    }
}
