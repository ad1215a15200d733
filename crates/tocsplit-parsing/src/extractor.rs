use tocsplit_core::{ChapterEntry, DocumentSource, split_points};

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::harvest::{TocRange, TocText, harvest_toc};
use crate::toc::{ChapterList, parse_chapter_list_with_config};

/// Harvests TOC pages and parses them into a chapter list.
#[derive(Debug, Clone, Default)]
pub struct TocExtractor {
    config: ParsingConfig,
}

impl TocExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Parse already-harvested text. Zero entries is [`ParsingError::NoChapters`].
    pub fn parse(&self, text: &str) -> Result<ChapterList, ParsingError> {
        let list = parse_chapter_list_with_config(text, &self.config);
        if list.is_empty() {
            return Err(ParsingError::NoChapters);
        }
        Ok(list)
    }

    /// Harvest `range` from `doc`, then parse it.
    ///
    /// The harvested text is returned even when parsing finds nothing, so the
    /// caller can still write it out for inspection.
    pub fn extract(
        &self,
        doc: &dyn DocumentSource,
        range: TocRange,
    ) -> Result<(TocText, Result<ChapterList, ParsingError>), ParsingError> {
        let toc = harvest_toc(doc, range)?;
        let chapters = self.parse(&toc.text);
        Ok((toc, chapters))
    }

    /// Entries that start an output file under this extractor's `split_depth`.
    pub fn split_points(&self, list: &ChapterList) -> Vec<ChapterEntry> {
        split_points(&list.entries, self.config.split_depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfigBuilder;
    use tocsplit_core::mock::MockDocument;

    fn book() -> MockDocument {
        MockDocument::new()
            .page("Title")
            .page("Contents\n1 Introduction 5\n1.1 Background 6")
            .page("2 Methods 12\n3 Results 20")
            .page("Body")
    }

    #[test]
    fn extracts_entries_across_pages() {
        let (toc, chapters) = TocExtractor::new()
            .extract(&book(), TocRange::new(2, 3))
            .unwrap();
        assert_eq!(chapters.unwrap().len(), 4);
        assert!(toc.text.starts_with("--- File Page 2 ---"));
    }

    #[test]
    fn split_points_follow_configured_depth() {
        let extractor = TocExtractor::new();
        let list = extractor
            .parse("1 Introduction 5\n1.1 Background 6\n2 Methods 12\n")
            .unwrap();
        assert_eq!(extractor.split_points(&list).len(), 2);

        let deep = TocExtractor::with_config(ParsingConfigBuilder::new().split_depth(2).build().unwrap());
        assert_eq!(deep.split_points(&list).len(), 3);
    }

    #[test]
    fn no_chapters_keeps_harvested_text() {
        let (toc, chapters) = TocExtractor::new()
            .extract(&book(), TocRange::new(1, 1))
            .unwrap();
        assert_eq!(toc.text, "--- File Page 1 ---\nTitle");
        assert!(matches!(chapters, Err(ParsingError::NoChapters)));
    }

    #[test]
    fn invalid_range_is_configuration_error() {
        let err = TocExtractor::new()
            .extract(&book(), TocRange::new(3, 2))
            .unwrap_err();
        assert!(matches!(err, ParsingError::Configuration { .. }));
    }
}
