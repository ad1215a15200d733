use std::io::Write;

use owo_colors::OwoColorize;
use tocsplit_core::OffsetMethod;
use tocsplit_parsing::EntryFlag;
use tocsplit_pipeline::{PipelineEvent, PipelineOutcome};
use tocsplit_reporting::format_chapter_list;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn banner(w: &mut dyn Write, title: &str, color: ColorMode) -> std::io::Result<()> {
    let rule = "=".repeat(40);
    writeln!(w)?;
    writeln!(w, "{rule}")?;
    if color.enabled() {
        writeln!(w, "  {}", title.bold())?;
    } else {
        writeln!(w, "  {title}")?;
    }
    writeln!(w, "{rule}")
}

fn warn_line(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", format!("Warning: {message}").yellow())
    } else {
        writeln!(w, "Warning: {message}")
    }
}

/// Print a pipeline stage event and flush. Per-chapter progress is left to
/// the progress bar.
pub fn print_event(
    w: &mut dyn Write,
    event: &PipelineEvent<'_>,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        PipelineEvent::TocHarvested {
            first_page,
            last_page,
            clamped,
        } => {
            writeln!(w, "Read table of contents from file pages {first_page}-{last_page}")?;
            if *clamped {
                warn_line(
                    w,
                    &format!("TOC range ends past the document; stopped at page {last_page}"),
                    color,
                )?;
            }
        }
        PipelineEvent::ChaptersParsed { list, split_points } => {
            writeln!(
                w,
                "Found {} numbered entries ({} chapters to split)",
                list.len(),
                split_points
            )?;
            let discarded = list.stats.discarded();
            if discarded > 0 {
                let msg = format!(
                    "(Discarded {} short titles, {} low page numbers, {} duplicates, {} out of order)",
                    list.stats.short_title,
                    list.stats.low_page,
                    list.stats.duplicate,
                    list.stats.out_of_order_dropped
                );
                if color.enabled() {
                    writeln!(w, "{}", msg.dimmed())?;
                } else {
                    writeln!(w, "{msg}")?;
                }
            }
            for flag in &list.flags {
                let label = list
                    .entries
                    .get(flag.index())
                    .map(|e| e.label())
                    .unwrap_or_default();
                let msg = match flag {
                    EntryFlag::OutOfOrder {
                        printed_page,
                        previous_page,
                        ..
                    } => format!(
                        "'{label}' is listed on page {printed_page}, before an earlier entry's page {previous_page}"
                    ),
                    EntryFlag::DuplicatePage { printed_page, .. } => {
                        format!("'{label}' shares page {printed_page} with the entry before it")
                    }
                };
                warn_line(w, &msg, color)?;
            }
        }
        PipelineEvent::ArtifactWritten(path) => {
            writeln!(w, "Successfully wrote: {}", path.display())?;
        }
        PipelineEvent::OffsetResolved(offset) => {
            banner(w, "OFFSET CALCULATION METHOD", color)?;
            let method = match offset.method {
                OffsetMethod::Automatic { matched_page } => {
                    format!("Title-Based Scan (heading found on file page {matched_page})")
                }
                OffsetMethod::Manual { provided_page } => {
                    format!("Manual Input (Fallback, file page {provided_page})")
                }
            };
            writeln!(w, "The page offset was determined using: {method}")?;
            writeln!(w, "{}", "-".repeat(40))?;
            let value = if offset.value >= 0 {
                format!("+{}", offset.value)
            } else {
                offset.value.to_string()
            };
            if color.enabled() {
                writeln!(w, "Final Calculated Page Offset used: {} pages.", value.bold())?;
            } else {
                writeln!(w, "Final Calculated Page Offset used: {value} pages.")?;
            }
        }
        PipelineEvent::RangesPlanned { ranges, skipped } => {
            banner(w, "CALCULATED CHAPTER LIST (Printed Pages)", color)?;
            write!(w, "{}", format_chapter_list(ranges))?;
            writeln!(w, "{}", "=".repeat(40))?;
            for skip in skipped.iter() {
                warn_line(w, &format!("Skipping {skip}"), color)?;
            }
        }
        PipelineEvent::ChapterFailed(failure) => {
            warn_line(
                w,
                &format!("could not write '{}': {}", failure.entry.label(), failure.error),
                color,
            )?;
        }
        PipelineEvent::ChapterWriting { .. } | PipelineEvent::ChapterWritten(_) => {}
    }
    w.flush()
}

/// Print the final list of written files and anything that went missing.
pub fn print_summary(
    w: &mut dyn Write,
    outcome: &PipelineOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let report = &outcome.report;
    writeln!(w)?;
    for written in &report.written {
        writeln!(
            w,
            "Created: {} (File Pages {}-{})",
            written.path.display(),
            written.start_physical_page,
            written.end_physical_page
        )?;
    }

    writeln!(w)?;
    let summary = format!(
        "{} written, {} skipped, {} failed",
        report.written.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if !color.enabled() {
        writeln!(w, "{summary}")?;
    } else if outcome.is_complete() {
        writeln!(w, "{}", summary.green().bold())?;
    } else {
        writeln!(w, "{}", summary.yellow().bold())?;
    }
    Ok(())
}
