use std::path::PathBuf;

use serde::Serialize;
use tocsplit_core::{ChapterEntry, ChapterRange, PageOffset, RangeError, RangePlan};
use tocsplit_parsing::{EntryFlag, FilterStats};
use tocsplit_split::{ChapterFailure, SplitReport, WrittenChapter};

/// Artifact file names written next to each other in the artifact directory.
pub const TOC_CONTENTS_FILE: &str = "TOC_contents.txt";
pub const METADATA_FILE: &str = "PDF_metadata.txt";
pub const RESULTS_FILE: &str = "Title_OCR_TOC_Results.txt";

/// One TOC entry with its page in both numbering schemes.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterRow {
    pub number: String,
    pub title: String,
    pub depth: usize,
    pub printed_page: u32,
    /// `printed_page + offset`; may fall outside the document.
    pub physical_page: i64,
    pub split_point: bool,
}

impl ChapterRow {
    pub fn label(&self) -> String {
        ChapterEntry::new(self.number.as_str(), self.title.as_str(), self.printed_page).label()
    }
}

/// Everything known about a run: how the offset was found, where each
/// chapter lands and what was written.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub source: PathBuf,
    pub page_count: usize,
    pub toc_start: usize,
    pub toc_end: usize,
    pub first_chapter: ChapterEntry,
    pub offset: PageOffset,
    pub chapters: Vec<ChapterRow>,
    pub ranges: Vec<ChapterRange>,
    pub skipped: Vec<RangeError>,
    pub flags: Vec<EntryFlag>,
    pub filter_stats: FilterStats,
    pub written: Vec<WrittenChapter>,
    pub failed: Vec<ChapterFailure>,
}

/// Inputs for [`ResolutionReport::new`].
pub struct ReportInputs<'a> {
    pub source: PathBuf,
    pub page_count: usize,
    pub toc_start: usize,
    pub toc_end: usize,
    pub entries: &'a [ChapterEntry],
    pub split_points: &'a [ChapterEntry],
    pub flags: &'a [EntryFlag],
    pub filter_stats: &'a FilterStats,
    pub first_chapter: &'a ChapterEntry,
    pub offset: PageOffset,
    pub plan: &'a RangePlan,
}

impl ResolutionReport {
    pub fn new(inputs: ReportInputs<'_>) -> Self {
        let chapters = inputs
            .entries
            .iter()
            .map(|e| ChapterRow {
                number: e.number.clone(),
                title: e.title.clone(),
                depth: e.depth(),
                printed_page: e.printed_page,
                physical_page: inputs.offset.physical(e.printed_page),
                split_point: inputs.split_points.contains(e),
            })
            .collect();

        Self {
            source: inputs.source,
            page_count: inputs.page_count,
            toc_start: inputs.toc_start,
            toc_end: inputs.toc_end,
            first_chapter: inputs.first_chapter.clone(),
            offset: inputs.offset,
            chapters,
            ranges: inputs.plan.ranges.clone(),
            skipped: inputs.plan.skipped.clone(),
            flags: inputs.flags.to_vec(),
            filter_stats: inputs.filter_stats.clone(),
            written: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record the outcome of splitting.
    pub fn with_split(mut self, split: &SplitReport) -> Self {
        self.written = split.written.clone();
        self.failed = split.failed.clone();
        self
    }

    /// Chapters that did not produce a file, whatever the reason.
    pub fn problem_count(&self) -> usize {
        self.skipped.len() + self.failed.len()
    }
}
