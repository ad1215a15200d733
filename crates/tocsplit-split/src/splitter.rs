use std::path::{Path, PathBuf};

use lopdf::Document;
use serde::Serialize;
use tocsplit_core::{ChapterEntry, ChapterRange, unique_file_names};

use crate::SplitError;
use crate::metadata::{DocumentMetadata, document_metadata};

/// One chapter file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenChapter {
    pub entry: ChapterEntry,
    pub path: PathBuf,
    pub start_physical_page: usize,
    pub end_physical_page: usize,
}

/// A chapter whose file could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterFailure {
    pub entry: ChapterEntry,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub written: Vec<WrittenChapter>,
    pub failed: Vec<ChapterFailure>,
}

/// Progress notifications from [`PdfSplitter::split`].
#[derive(Debug, Clone)]
pub enum SplitProgress<'a> {
    Writing {
        index: usize,
        total: usize,
        file_name: &'a str,
    },
    Written(&'a WrittenChapter),
    Failed(&'a ChapterFailure),
}

/// Writes page ranges of one source PDF as standalone files.
///
/// The source is parsed once. Each output is a copy of the whole container
/// with every page outside the range removed and unreferenced objects pruned,
/// so page content streams are carried over byte for byte.
pub struct PdfSplitter {
    source: Document,
    page_count: usize,
}

impl PdfSplitter {
    pub fn open(path: &Path) -> Result<Self, SplitError> {
        let source = Document::load(path).map_err(|e| SplitError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let page_count = source.get_pages().len();
        tracing::debug!(path = %path.display(), page_count, "loaded PDF container");
        Ok(Self { source, page_count })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Info dictionary of the source.
    pub fn metadata(&self) -> DocumentMetadata {
        document_metadata(&self.source)
    }

    /// Write physical pages `start..=end` (1-indexed) to `output`.
    pub fn write_range(&self, start: usize, end: usize, output: &Path) -> Result<(), SplitError> {
        if start == 0 || start > end || end > self.page_count {
            return Err(SplitError::InvalidRange {
                start,
                end,
                page_count: self.page_count,
            });
        }

        let mut doc = self.source.clone();
        let pages_to_remove: Vec<u32> = (1..start)
            .chain(end + 1..=self.page_count)
            .filter_map(|p| u32::try_from(p).ok())
            .collect();
        if !pages_to_remove.is_empty() {
            doc.delete_pages(&pages_to_remove);
        }
        doc.prune_objects();

        doc.save(output).map_err(|e| SplitError::Write {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Write every range into `output_dir`, creating it if needed.
    ///
    /// File names come from [`unique_file_names`]. A chapter that fails is
    /// recorded in the report and the rest are still written; only failing
    /// to create the directory aborts.
    pub fn split(
        &self,
        ranges: &[ChapterRange],
        output_dir: &Path,
        mut on_progress: impl FnMut(SplitProgress<'_>),
    ) -> Result<SplitReport, SplitError> {
        std::fs::create_dir_all(output_dir)?;

        let names = unique_file_names(ranges.iter().map(|r| &r.entry));
        let mut report = SplitReport::default();

        for (index, (range, name)) in ranges.iter().zip(&names).enumerate() {
            on_progress(SplitProgress::Writing {
                index,
                total: ranges.len(),
                file_name: name,
            });

            let path = output_dir.join(name);
            let (start, end) = range.physical_pages();
            match self.write_range(start, end, &path) {
                Ok(()) => {
                    tracing::info!(file = %path.display(), start, end, "wrote chapter");
                    report.written.push(WrittenChapter {
                        entry: range.entry.clone(),
                        path,
                        start_physical_page: start,
                        end_physical_page: end,
                    });
                    if let Some(written) = report.written.last() {
                        on_progress(SplitProgress::Written(written));
                    }
                }
                Err(e) => {
                    tracing::warn!(chapter = %range.entry.label(), error = %e, "failed to write chapter");
                    report.failed.push(ChapterFailure {
                        entry: range.entry.clone(),
                        error: e.to_string(),
                    });
                    if let Some(failed) = report.failed.last() {
                        on_progress(SplitProgress::Failed(failed));
                    }
                }
            }
        }

        Ok(report)
    }
}
