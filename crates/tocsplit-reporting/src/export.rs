use std::io::Write;
use std::path::Path;

use tocsplit_core::{ChapterRange, OffsetMethod};
use tocsplit_split::DocumentMetadata;

use crate::types::ResolutionReport;

/// Write `content` to `path`, creating parent directories.
pub fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(())
}

/// `PDF_metadata.txt` body.
pub fn format_metadata(source: &Path, metadata: &DocumentMetadata) -> String {
    let mut out = format!("--- PDF METADATA FOR: {} ---\n\n", source.display());
    if metadata.is_empty() {
        out.push_str("No metadata found.");
        return out;
    }
    for (key, value) in &metadata.entries {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out
}

fn signed(value: i64) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// `Title_OCR_TOC_Results.txt` body: how the offset was found, then every
/// chapter with its printed and physical page.
pub fn format_results(report: &ResolutionReport) -> String {
    let first = report.first_chapter.label();
    let mut out = String::new();
    match report.offset.method {
        OffsetMethod::Automatic { matched_page } => {
            out.push_str("--- TOC EXTRACTED VIA TITLE-BASED OCR ---\n");
            out.push_str(&format!(
                "Offset Calculated from: '{first}' found on file page {matched_page}\n"
            ));
        }
        OffsetMethod::Manual { provided_page } => {
            out.push_str("--- TOC OFFSET FROM MANUAL INPUT (Fallback) ---\n");
            out.push_str(&format!(
                "Offset Calculated from: '{first}' entered as file page {provided_page}\n"
            ));
        }
    }
    out.push_str(&format!(
        "Page offset: {} pages\n\n",
        signed(report.offset.value)
    ));

    for row in &report.chapters {
        let marker = if row.split_point { "" } else { "  " };
        out.push_str(&format!(
            "{:<40} Page {:>4}  File Page {:>4}\n",
            format!("{marker}{}", row.label()),
            row.printed_page,
            row.physical_page
        ));
    }

    if !report.skipped.is_empty() {
        out.push_str("\nSkipped chapters:\n");
        for skip in &report.skipped {
            out.push_str(&format!("  {skip}\n"));
        }
    }
    out
}

/// Console chapter list in printed pages: `Title ...... 5-11`.
pub fn format_chapter_list(ranges: &[ChapterRange]) -> String {
    if ranges.is_empty() {
        return "  No chapters defined or extracted.\n".to_string();
    }
    let mut out = String::new();
    for range in ranges {
        let (start, end) = range.printed_range();
        let pages = format!("{start}-{end}");
        let dots = ".".repeat(10usize.saturating_sub(pages.len()));
        out.push_str(&format!("{:<30} {dots} {pages}\n", range.entry.label()));
    }
    out
}

/// Machine-readable form of the whole report.
pub fn export_json(report: &ResolutionReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn write_json(path: &Path, report: &ResolutionReport) -> std::io::Result<()> {
    let json = export_json(report).map_err(std::io::Error::other)?;
    write_text(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::types::ReportInputs;
    use tocsplit_core::{ChapterEntry, PageOffset, compute_ranges};
    use tocsplit_parsing::FilterStats;

    fn entries() -> Vec<ChapterEntry> {
        vec![
            ChapterEntry::new("1", "Introduction", 5),
            ChapterEntry::new("1.1", "Scope", 6),
            ChapterEntry::new("2", "Methods", 12),
            ChapterEntry::new("3", "Results", 20),
        ]
    }

    fn report(method: OffsetMethod, anchor: usize) -> ResolutionReport {
        let entries = entries();
        let points: Vec<ChapterEntry> = entries.iter().filter(|e| e.depth() == 1).cloned().collect();
        let offset = PageOffset::anchored(anchor, 5, method);
        let plan = compute_ranges(&points, &offset, 30);
        ResolutionReport::new(ReportInputs {
            source: PathBuf::from("book.pdf"),
            page_count: 30,
            toc_start: 2,
            toc_end: 3,
            entries: &entries,
            split_points: &points,
            flags: &[],
            filter_stats: &FilterStats::default(),
            first_chapter: &points[0],
            offset,
            plan: &plan,
        })
    }

    #[test]
    fn metadata_dump_lists_keys() {
        let metadata = DocumentMetadata {
            entries: vec![
                ("Title".to_string(), "A Book".to_string()),
                ("Author".to_string(), "Someone".to_string()),
            ],
        };
        assert_eq!(
            format_metadata(Path::new("in/book.pdf"), &metadata),
            "--- PDF METADATA FOR: in/book.pdf ---\n\nTitle: A Book\nAuthor: Someone\n"
        );
    }

    #[test]
    fn metadata_dump_without_entries() {
        assert_eq!(
            format_metadata(Path::new("book.pdf"), &DocumentMetadata::default()),
            "--- PDF METADATA FOR: book.pdf ---\n\nNo metadata found."
        );
    }

    #[test]
    fn results_for_automatic_offset() {
        let text = format_results(&report(OffsetMethod::Automatic { matched_page: 9 }, 9));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "--- TOC EXTRACTED VIA TITLE-BASED OCR ---");
        assert_eq!(
            lines[1],
            "Offset Calculated from: '1 Introduction' found on file page 9"
        );
        assert_eq!(lines[2], "Page offset: +4 pages");
        assert_eq!(lines[3], "");
        assert_eq!(
            lines[4],
            format!("{:<40} Page    5  File Page    9", "1 Introduction")
        );
        assert!(lines[5].starts_with("  1.1 Scope"));
        assert!(lines[7].ends_with("Page   20  File Page   24"));
    }

    #[test]
    fn results_for_manual_offset() {
        let text = format_results(&report(OffsetMethod::Manual { provided_page: 3 }, 3));
        assert!(text.starts_with("--- TOC OFFSET FROM MANUAL INPUT (Fallback) ---\n"));
        assert!(text.contains("entered as file page 3"));
        assert!(text.contains("Page offset: -2 pages"));
    }

    #[test]
    fn chapter_list_uses_dotted_layout() {
        let report = report(OffsetMethod::Automatic { matched_page: 9 }, 9);
        let list = format_chapter_list(&report.ranges);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<30} {} {}", "1 Introduction", ".".repeat(6), "5-11"));
        assert_eq!(lines[2], format!("{:<30} {} {}", "3 Results", ".".repeat(5), "20-26"));
    }

    #[test]
    fn json_export_carries_offset_and_chapters() {
        let report = report(OffsetMethod::Automatic { matched_page: 9 }, 9);
        let value: serde_json::Value = serde_json::from_str(&export_json(&report).unwrap()).unwrap();
        assert_eq!(value["offset"]["value"], 4);
        assert_eq!(value["offset"]["method"], "automatic");
        assert_eq!(value["offset"]["matched_page"], 9);
        assert_eq!(value["chapters"].as_array().unwrap().len(), 4);
        assert_eq!(value["ranges"][1]["start_physical_page"], 16);
    }

    #[test]
    fn write_text_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("TOC_contents.txt");
        write_text(&path, "1 Introduction 5\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 Introduction 5\n");
    }
}
