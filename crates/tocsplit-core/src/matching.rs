use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize heading text for comparison.
///
/// Steps (order matters):
/// 1. Expand typographic ligatures (ﬁ → fi, ﬂ → fl)
/// 2. Unicode NFKD normalization, dropping combining marks (é → e)
/// 3. Lowercase
/// 4. Replace anything that is not alphanumeric with a space
/// 5. Collapse runs of whitespace
pub fn normalize_heading(text: &str) -> String {
    let text = text
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the search key for a chapter title: its first `max_words` normalized words.
///
/// Numbers in the title are title words ("1984", "2001 A Space Odyssey");
/// the chapter number is already split off by the parser.
pub fn search_key(title: &str, max_words: usize) -> String {
    normalize_heading(title)
        .split(' ')
        .filter(|w| !w.is_empty())
        .take(max_words.max(1))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a heading block contains the search key.
///
/// Whole-word containment first; otherwise a rapidfuzz ratio of at least
/// `fuzzy_threshold` (0.0-1.0) between the normalized block and the key.
pub fn heading_matches(block: &str, key: &str, fuzzy_threshold: f64) -> bool {
    if key.is_empty() {
        return false;
    }
    let block = normalize_heading(block);
    if block.is_empty() {
        return false;
    }

    if format!(" {block} ").contains(&format!(" {key} ")) {
        return true;
    }

    rapidfuzz::fuzz::ratio(block.chars(), key.chars()) >= fuzzy_threshold
}

/// Whether `page_number` appears in `text` as a standalone numeric token.
///
/// `"page 12"` contains 12; `"120"` and `"p12"` do not.
pub fn contains_page_token(text: &str, page_number: u32) -> bool {
    let needle = page_number.to_string();
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == needle)
}
