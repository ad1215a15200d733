pub mod export;
pub mod types;

pub use export::{
    export_json, format_chapter_list, format_metadata, format_results, write_json, write_text,
};
pub use types::{
    ChapterRow, METADATA_FILE, RESULTS_FILE, ReportInputs, ResolutionReport, TOC_CONTENTS_FILE,
};
