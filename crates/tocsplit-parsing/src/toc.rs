use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tocsplit_core::ChapterEntry;

use crate::config::ParsingConfig;

/// Default chapter line: `2.1 Title ..... 33`, `3. Title 41`, `4 Title 50`.
static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<number>\d+(?:\.\d+)*)\.?\s+(?P<title>.+?)(?:\s*\.{2,}\s*|\s+)(?P<page>\d+)\s*$",
    )
    .unwrap()
});

/// Something suspicious about an entry that was kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryFlag {
    /// Printed page is lower than an earlier entry's.
    OutOfOrder {
        index: usize,
        printed_page: u32,
        previous_page: u32,
    },
    /// Same printed page as the entry right before it.
    DuplicatePage { index: usize, printed_page: u32 },
}

impl EntryFlag {
    pub fn index(&self) -> usize {
        match *self {
            EntryFlag::OutOfOrder { index, .. } | EntryFlag::DuplicatePage { index, .. } => index,
        }
    }
}

/// Counts of lines that matched the pattern but were discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total_matched: usize,
    pub short_title: usize,
    pub low_page: usize,
    pub duplicate: usize,
    pub out_of_order_dropped: usize,
}

impl FilterStats {
    pub fn discarded(&self) -> usize {
        self.short_title + self.low_page + self.duplicate + self.out_of_order_dropped
    }
}

/// Parsed TOC: entries in order of appearance plus anything worth reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChapterList {
    pub entries: Vec<ChapterEntry>,
    pub flags: Vec<EntryFlag>,
    pub stats: FilterStats,
}

impl ChapterList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Parse TOC text into chapter entries using the built-in pattern.
pub fn parse_chapter_list(text: &str) -> ChapterList {
    parse_chapter_list_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`parse_chapter_list`].
pub(crate) fn parse_chapter_list_with_config(text: &str, config: &ParsingConfig) -> ChapterList {
    let chapter_re = config.chapter_re.as_ref().unwrap_or(&CHAPTER_RE);

    let mut list = ChapterList::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut max_page: Option<u32> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        let Some(caps) = chapter_re.captures(line) else {
            continue;
        };

        let number = caps
            .name("number")
            .map(|m| m.as_str().trim().trim_end_matches('.'))
            .unwrap_or("");
        let title = caps.name("title").map(|m| clean_title(m.as_str())).unwrap_or_default();
        let Some(printed_page) = caps
            .name("page")
            .and_then(|m| m.as_str().trim().parse::<u32>().ok())
        else {
            continue;
        };
        list.stats.total_matched += 1;

        if title.chars().count() < config.min_title_chars {
            tracing::debug!(line, "discarding entry with short title");
            list.stats.short_title += 1;
            continue;
        }
        if printed_page < config.min_printed_page {
            tracing::debug!(line, printed_page, "discarding entry with low page number");
            list.stats.low_page += 1;
            continue;
        }
        if !seen.insert((number.to_string(), title.clone())) {
            tracing::debug!(line, "discarding duplicate entry");
            list.stats.duplicate += 1;
            continue;
        }

        let index = list.entries.len();
        match max_page {
            Some(previous) if printed_page < previous => {
                if config.drop_out_of_order {
                    tracing::warn!(line, printed_page, previous, "dropping out-of-order entry");
                    list.stats.out_of_order_dropped += 1;
                    continue;
                }
                tracing::warn!(line, printed_page, previous, "out-of-order entry");
                list.flags.push(EntryFlag::OutOfOrder {
                    index,
                    printed_page,
                    previous_page: previous,
                });
            }
            _ => {}
        }
        if let Some(prev) = list.entries.last() {
            if prev.printed_page == printed_page {
                tracing::warn!(line, printed_page, "entry shares its page with the previous entry");
                list.flags.push(EntryFlag::DuplicatePage {
                    index,
                    printed_page,
                });
            }
        }

        max_page = Some(max_page.map_or(printed_page, |m| m.max(printed_page)));
        list.entries.push(ChapterEntry::new(number, title, printed_page));
    }

    tracing::info!(
        entries = list.entries.len(),
        discarded = list.stats.discarded(),
        flagged = list.flags.len(),
        "parsed chapter list"
    );

    list
}

/// Strip dot leaders and surrounding whitespace from a captured title.
fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
