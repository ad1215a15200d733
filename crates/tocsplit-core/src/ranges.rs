use serde::Serialize;
use thiserror::Error;

use crate::{ChapterEntry, PageOffset};

/// Inclusive span of physical pages belonging to one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRange {
    pub entry: ChapterEntry,
    pub start_physical_page: usize,
    pub end_physical_page: usize,
    /// Printed page number of the last page (may be beyond the book's
    /// numbering when trailing matter is folded into the last chapter).
    pub printed_end_page: i64,
}

impl ChapterRange {
    pub fn page_count(&self) -> usize {
        self.end_physical_page - self.start_physical_page + 1
    }

    /// `(start, end)` physical pages, both inclusive.
    pub fn physical_pages(&self) -> (usize, usize) {
        (self.start_physical_page, self.end_physical_page)
    }

    /// `(start, end)` as printed in the book.
    pub fn printed_range(&self) -> (i64, i64) {
        (i64::from(self.entry.printed_page), self.printed_end_page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeErrorKind {
    /// The computed start lies after the computed end.
    Inverted,
    /// The range leaves `[1, page_count]`.
    OutOfBounds,
}

/// A chapter whose computed page range cannot be extracted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid page range {start}-{end} for '{}' ({kind:?}, document has {page_count} pages)", .entry.label())]
pub struct RangeError {
    pub entry: ChapterEntry,
    pub start: i64,
    pub end: i64,
    pub page_count: usize,
    pub kind: RangeErrorKind,
}

/// Result of range planning: extractable ranges plus the chapters skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RangePlan {
    pub ranges: Vec<ChapterRange>,
    pub skipped: Vec<RangeError>,
}

/// Entries that start a new output file.
///
/// An entry is a split point when its depth is at most `split_depth`; deeper
/// entries fold into the preceding split point's range. A `split_depth` of 0
/// is treated as 1.
pub fn split_points(entries: &[ChapterEntry], split_depth: usize) -> Vec<ChapterEntry> {
    let depth = split_depth.max(1);
    entries
        .iter()
        .filter(|e| e.depth() <= depth)
        .cloned()
        .collect()
}

/// Compute the physical page range of every chapter.
///
/// Chapter `i` starts at `printed[i] + offset` and ends one page before
/// chapter `i + 1` starts; the last chapter runs to `page_count`. Ranges that
/// are inverted or leave the document are reported in [`RangePlan::skipped`]
/// and do not affect the others.
pub fn compute_ranges(entries: &[ChapterEntry], offset: &PageOffset, page_count: usize) -> RangePlan {
    let mut plan = RangePlan::default();

    for (i, entry) in entries.iter().enumerate() {
        let start = offset.physical(entry.printed_page);
        let end = match entries.get(i + 1) {
            Some(next) => offset.physical(next.printed_page) - 1,
            None => page_count as i64,
        };

        let last_page = page_count as i64;
        let kind = if start < 1 || start > last_page || end > last_page {
            Some(RangeErrorKind::OutOfBounds)
        } else if start > end {
            Some(RangeErrorKind::Inverted)
        } else {
            None
        };

        match kind {
            Some(kind) => {
                let err = RangeError {
                    entry: entry.clone(),
                    start,
                    end,
                    page_count,
                    kind,
                };
                tracing::warn!(error = %err, "skipping chapter");
                plan.skipped.push(err);
            }
            None => plan.ranges.push(ChapterRange {
                entry: entry.clone(),
                start_physical_page: start as usize,
                end_physical_page: end as usize,
                printed_end_page: end - offset.value,
            }),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OffsetMethod;

    fn offset(value: i64) -> PageOffset {
        PageOffset {
            value,
            method: OffsetMethod::Manual {
                provided_page: 1,
            },
        }
    }

    fn three_chapters() -> Vec<ChapterEntry> {
        vec![
            ChapterEntry::new("1", "Introduction", 5),
            ChapterEntry::new("2", "Methods", 12),
            ChapterEntry::new("3", "Results", 20),
        ]
    }

    #[test]
    fn ranges_partition_document_tail() {
        let plan = compute_ranges(&three_chapters(), &offset(2), 30);
        assert!(plan.skipped.is_empty());
        let pages: Vec<_> = plan.ranges.iter().map(ChapterRange::physical_pages).collect();
        assert_eq!(pages, vec![(7, 13), (14, 21), (22, 30)]);

        // No gaps, no overlaps, from the first start to the last page.
        let covered: Vec<usize> = plan
            .ranges
            .iter()
            .flat_map(|r| r.start_physical_page..=r.end_physical_page)
            .collect();
        assert_eq!(covered, (7..=30).collect::<Vec<_>>());
    }

    #[test]
    fn last_chapter_ends_at_page_count() {
        let plan = compute_ranges(&three_chapters(), &offset(0), 95);
        let last = plan.ranges.last().unwrap();
        assert_eq!(last.end_physical_page, 95);
        assert_eq!(last.printed_end_page, 95);
    }

    #[test]
    fn printed_end_page_removes_offset() {
        let plan = compute_ranges(&three_chapters(), &offset(2), 30);
        assert_eq!(plan.ranges[0].printed_end_page, 11);
        assert_eq!(plan.ranges[0].page_count(), 7);
    }

    #[test]
    fn duplicate_printed_page_is_inverted_and_skipped() {
        let entries = vec![
            ChapterEntry::new("1", "One", 5),
            ChapterEntry::new("2", "Two", 5),
            ChapterEntry::new("3", "Three", 9),
        ];
        let plan = compute_ranges(&entries, &offset(0), 20);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].entry.number, "1");
        assert_eq!(plan.skipped[0].kind, RangeErrorKind::Inverted);
        assert_eq!(plan.ranges.len(), 2);
    }

    #[test]
    fn out_of_bounds_chapters_are_skipped() {
        let entries = vec![
            ChapterEntry::new("1", "One", 5),
            ChapterEntry::new("2", "Two", 40),
        ];
        let plan = compute_ranges(&entries, &offset(0), 20);
        // Chapter 1 would end at 39, chapter 2 would start at 40.
        assert_eq!(plan.ranges.len(), 0);
        assert_eq!(plan.skipped.len(), 2);
        assert!(plan
            .skipped
            .iter()
            .all(|e| e.kind == RangeErrorKind::OutOfBounds));
    }

    #[test]
    fn negative_start_is_out_of_bounds() {
        let entries = vec![ChapterEntry::new("1", "One", 1)];
        let plan = compute_ranges(&entries, &offset(-3), 20);
        assert_eq!(plan.skipped[0].start, -2);
        assert_eq!(plan.skipped[0].kind, RangeErrorKind::OutOfBounds);
    }

    #[test]
    fn split_points_fold_sub_chapters() {
        let entries = vec![
            ChapterEntry::new("1", "Intro", 1),
            ChapterEntry::new("1.1", "Background", 3),
            ChapterEntry::new("2", "Methods", 10),
            ChapterEntry::new("2.1", "Setup", 11),
            ChapterEntry::new("2.1.1", "Hardware", 12),
        ];
        let top: Vec<_> = split_points(&entries, 1).into_iter().map(|e| e.number).collect();
        assert_eq!(top, vec!["1", "2"]);

        let two: Vec<_> = split_points(&entries, 2).into_iter().map(|e| e.number).collect();
        assert_eq!(two, vec!["1", "1.1", "2", "2.1"]);

        assert_eq!(split_points(&entries, 0).len(), 2);
    }

    #[test]
    fn sub_chapters_fold_into_parent_range() {
        let entries = vec![
            ChapterEntry::new("1", "Intro", 1),
            ChapterEntry::new("1.1", "Background", 3),
            ChapterEntry::new("2", "Methods", 10),
        ];
        let points = split_points(&entries, 1);
        let plan = compute_ranges(&points, &offset(0), 15);
        let pages: Vec<_> = plan.ranges.iter().map(ChapterRange::physical_pages).collect();
        assert_eq!(pages, vec![(1, 9), (10, 15)]);
    }
}
