//! End-to-end run: harvest the TOC, parse chapters, resolve the page offset,
//! plan ranges and write one PDF per chapter plus the text artifacts.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tocsplit_core::{
    BackendError, ChapterRange, CoreError, DocumentSource, OperatorInput, PageOffset,
    RangeError, ResolverConfig, compute_ranges, resolve_offset,
};
use tocsplit_parsing::{ChapterList, ParsingConfig, ParsingError, TocExtractor, TocRange};
use tocsplit_pdf_mupdf::MupdfDocument;
use tocsplit_reporting::{
    METADATA_FILE, RESULTS_FILE, ReportInputs, ResolutionReport, TOC_CONTENTS_FILE,
    format_metadata, format_results, write_json, write_text,
};
use tocsplit_split::{ChapterFailure, PdfSplitter, SplitError, SplitProgress, WrittenChapter};

/// Default name of the chapter output directory.
pub const DEFAULT_CHAPTERS_DIR: &str = "chapters_output";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error("offset resolution failed: {0}")]
    Offset(#[from] CoreError),
    #[error("failed to open document: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("failed to write {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a run needs. Nothing is read from globals.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub toc_range: TocRange,
    pub parsing: ParsingConfig,
    pub resolver: ResolverConfig,
    /// Directory for the text artifacts.
    pub artifact_dir: PathBuf,
    /// Chapter output directory; relative paths are taken under `artifact_dir`.
    pub chapters_dir: PathBuf,
    /// Optional JSON export of the run report.
    pub json_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, toc_range: TocRange) -> Self {
        Self {
            input: input.into(),
            toc_range,
            parsing: ParsingConfig::default(),
            resolver: ResolverConfig::default(),
            artifact_dir: PathBuf::from("."),
            chapters_dir: PathBuf::from(DEFAULT_CHAPTERS_DIR),
            json_path: None,
        }
    }

    pub fn chapters_path(&self) -> PathBuf {
        if self.chapters_dir.is_absolute() {
            self.chapters_dir.clone()
        } else {
            self.artifact_dir.join(&self.chapters_dir)
        }
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.artifact_dir.join(name)
    }
}

/// Stage notifications for front ends.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    TocHarvested {
        first_page: usize,
        last_page: usize,
        clamped: bool,
    },
    ChaptersParsed {
        list: &'a ChapterList,
        split_points: usize,
    },
    ArtifactWritten(&'a Path),
    OffsetResolved(&'a PageOffset),
    RangesPlanned {
        ranges: &'a [ChapterRange],
        skipped: &'a [RangeError],
    },
    ChapterWriting {
        index: usize,
        total: usize,
        file_name: &'a str,
    },
    ChapterWritten(&'a WrittenChapter),
    ChapterFailed(&'a ChapterFailure),
}

/// Result of a completed run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: ResolutionReport,
}

impl PipelineOutcome {
    /// Whether every planned chapter was written.
    pub fn is_complete(&self) -> bool {
        self.report.problem_count() == 0
    }
}

/// Open `config.input` with MuPDF and run the whole pipeline.
pub fn run_pipeline(
    config: &RunConfig,
    operator: &mut dyn OperatorInput,
    on_event: impl FnMut(PipelineEvent<'_>),
) -> Result<PipelineOutcome, PipelineError> {
    let doc = MupdfDocument::open(&config.input)?;
    run_with_document(config, &doc, operator, on_event)
}

/// Run the pipeline reading page text from `doc`; the file at
/// `config.input` is still used for metadata and splitting.
pub fn run_with_document(
    config: &RunConfig,
    doc: &dyn DocumentSource,
    operator: &mut dyn OperatorInput,
    mut on_event: impl FnMut(PipelineEvent<'_>),
) -> Result<PipelineOutcome, PipelineError> {
    // 1. TOC text, written out before parsing so it can be inspected on failure
    let extractor = TocExtractor::with_config(config.parsing.clone());
    let (toc, parsed) = extractor.extract(doc, config.toc_range)?;
    on_event(PipelineEvent::TocHarvested {
        first_page: toc.range.start,
        last_page: toc.range.end,
        clamped: toc.clamped,
    });
    let path = write_artifact(config.artifact_path(TOC_CONTENTS_FILE), &toc.text)?;
    on_event(PipelineEvent::ArtifactWritten(&path));

    let list = parsed?;
    let split_points = extractor.split_points(&list);
    on_event(PipelineEvent::ChaptersParsed {
        list: &list,
        split_points: split_points.len(),
    });
    let Some(first) = split_points.first() else {
        return Err(ParsingError::NoChapters.into());
    };

    // 2. Metadata, from the same container that is split later
    let splitter = PdfSplitter::open(&config.input)?;
    let metadata = format_metadata(&config.input, &splitter.metadata());
    let path = write_artifact(config.artifact_path(METADATA_FILE), &metadata)?;
    on_event(PipelineEvent::ArtifactWritten(&path));

    let page_count = doc.page_count();
    if splitter.page_count() != page_count {
        tracing::warn!(
            text_pages = page_count,
            container_pages = splitter.page_count(),
            "page counts disagree between text and container readers"
        );
    }

    // 3. Offset
    let offset = resolve_offset(doc, first, toc.range.end, &config.resolver, operator)?;
    tracing::info!(
        offset = offset.value,
        method = ?offset.method,
        "resolved page offset"
    );
    on_event(PipelineEvent::OffsetResolved(&offset));

    // 4. Ranges and the results file
    let plan = compute_ranges(&split_points, &offset, page_count.min(splitter.page_count()));
    on_event(PipelineEvent::RangesPlanned {
        ranges: &plan.ranges,
        skipped: &plan.skipped,
    });

    let report = ResolutionReport::new(ReportInputs {
        source: config.input.clone(),
        page_count,
        toc_start: toc.range.start,
        toc_end: toc.range.end,
        entries: &list.entries,
        split_points: &split_points,
        flags: &list.flags,
        filter_stats: &list.stats,
        first_chapter: first,
        offset,
        plan: &plan,
    });
    let path = write_artifact(config.artifact_path(RESULTS_FILE), &format_results(&report))?;
    on_event(PipelineEvent::ArtifactWritten(&path));

    // 5. Chapter files
    let split = splitter.split(&plan.ranges, &config.chapters_path(), |progress| {
        match progress {
            SplitProgress::Writing {
                index,
                total,
                file_name,
            } => on_event(PipelineEvent::ChapterWriting {
                index,
                total,
                file_name,
            }),
            SplitProgress::Written(written) => on_event(PipelineEvent::ChapterWritten(written)),
            SplitProgress::Failed(failed) => on_event(PipelineEvent::ChapterFailed(failed)),
        }
    })?;
    let report = report.with_split(&split);

    if let Some(json_path) = &config.json_path {
        write_json(json_path, &report).map_err(|source| PipelineError::Artifact {
            path: json_path.clone(),
            source,
        })?;
        on_event(PipelineEvent::ArtifactWritten(json_path));
    }

    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "run complete"
    );

    Ok(PipelineOutcome { report })
}

fn write_artifact(path: PathBuf, content: &str) -> Result<PathBuf, PipelineError> {
    write_text(&path, content).map_err(|source| PipelineError::Artifact {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
