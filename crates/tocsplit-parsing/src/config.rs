use regex::Regex;

use crate::ParsingError;

/// Capture groups every chapter pattern must define.
pub const REQUIRED_GROUPS: [&str; 3] = ["number", "title", "page"];

/// Configuration for TOC parsing.
///
/// `chapter_re: None` means "use the built-in pattern".
/// Use [`ParsingConfigBuilder`] to construct with a string pattern.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Line pattern with `number`, `title` and `page` named groups.
    pub(crate) chapter_re: Option<Regex>,
    /// Entries deeper than this are recorded but are not split points (default: 1).
    pub(crate) split_depth: usize,
    /// Minimum title length in characters (default: 2).
    pub(crate) min_title_chars: usize,
    /// Minimum printed page number (default: 1).
    pub(crate) min_printed_page: u32,
    /// Drop entries whose printed page is lower than an earlier entry's (default: false).
    pub(crate) drop_out_of_order: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            chapter_re: None,
            split_depth: 1,
            min_title_chars: 2,
            min_printed_page: 1,
            drop_out_of_order: false,
        }
    }
}

impl ParsingConfig {
    pub fn split_depth(&self) -> usize {
        self.split_depth
    }
}

/// Builder for [`ParsingConfig`].
///
/// Fails fast in [`build()`](Self::build) if the chapter pattern is invalid or
/// lacks a required named group.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    chapter_re: Option<String>,
    split_depth: Option<usize>,
    min_title_chars: Option<usize>,
    min_printed_page: Option<u32>,
    drop_out_of_order: Option<bool>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chapter_regex(mut self, pattern: &str) -> Self {
        self.chapter_re = Some(pattern.to_string());
        self
    }

    pub fn split_depth(mut self, depth: usize) -> Self {
        self.split_depth = Some(depth);
        self
    }

    pub fn min_title_chars(mut self, n: usize) -> Self {
        self.min_title_chars = Some(n);
        self
    }

    pub fn min_printed_page(mut self, page: u32) -> Self {
        self.min_printed_page = Some(page);
        self
    }

    pub fn drop_out_of_order(mut self, drop: bool) -> Self {
        self.drop_out_of_order = Some(drop);
        self
    }

    /// Compile the pattern and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let chapter_re = match self.chapter_re {
            Some(pattern) => {
                let re = Regex::new(&pattern)?;
                let names: Vec<&str> = re.capture_names().flatten().collect();
                if let Some(missing) = REQUIRED_GROUPS.iter().find(|g| !names.contains(*g)) {
                    return Err(ParsingError::MissingGroup(*missing));
                }
                Some(re)
            }
            None => None,
        };

        Ok(ParsingConfig {
            chapter_re,
            split_depth: self.split_depth.unwrap_or(1).max(1),
            min_title_chars: self.min_title_chars.unwrap_or(2),
            min_printed_page: self.min_printed_page.unwrap_or(1),
            drop_out_of_order: self.drop_out_of_order.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.split_depth, 1);
        assert_eq!(config.min_title_chars, 2);
        assert_eq!(config.min_printed_page, 1);
        assert!(!config.drop_out_of_order);
        assert!(config.chapter_re.is_none());
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .split_depth(2)
            .min_title_chars(6)
            .min_printed_page(2)
            .drop_out_of_order(true)
            .build()
            .unwrap();
        assert_eq!(config.split_depth, 2);
        assert_eq!(config.min_title_chars, 6);
        assert_eq!(config.min_printed_page, 2);
        assert!(config.drop_out_of_order);
    }

    #[test]
    fn test_builder_zero_depth_becomes_one() {
        let config = ParsingConfigBuilder::new().split_depth(0).build().unwrap();
        assert_eq!(config.split_depth, 1);
    }

    #[test]
    fn test_builder_custom_regex() {
        let config = ParsingConfigBuilder::new()
            .chapter_regex(r"^Kapitel (?P<number>\d+): (?P<title>.+) S\. (?P<page>\d+)$")
            .build()
            .unwrap();
        assert!(config.chapter_re.is_some());
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new().chapter_regex(r"[invalid").build();
        assert!(matches!(result, Err(ParsingError::InvalidPattern(_))));
    }

    #[test]
    fn test_builder_missing_group() {
        let result = ParsingConfigBuilder::new()
            .chapter_regex(r"^(?P<number>\d+) (?P<title>.+)$")
            .build();
        assert!(matches!(result, Err(ParsingError::MissingGroup("page"))));
    }
}
