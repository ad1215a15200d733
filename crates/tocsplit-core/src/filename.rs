use std::collections::HashSet;

use crate::ChapterEntry;

/// Replace every character that is not alphanumeric, space, `_` or `-` with
/// `_`, then trim surrounding whitespace and underscores.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    replaced
        .trim_matches(|c: char| c.is_whitespace() || c == '_')
        .to_string()
}

/// `<Number>_<SanitizedTitle>.pdf`, or `<Number>.pdf` when the title
/// sanitizes to nothing.
pub fn chapter_file_name(entry: &ChapterEntry) -> String {
    let number: String = entry
        .number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let number = number.trim_matches('.');
    let title = sanitize_title(&entry.title);

    match (number.is_empty(), title.is_empty()) {
        (false, false) => format!("{number}_{title}.pdf"),
        (false, true) => format!("{number}.pdf"),
        (true, false) => format!("{title}.pdf"),
        (true, true) => "chapter.pdf".to_string(),
    }
}

/// File names for `entries`, in order, with collisions resolved.
///
/// Names are compared case-insensitively (so they stay distinct on
/// case-folding filesystems); the second and later holders of a name get a
/// `_2`, `_3`, … suffix before the extension.
pub fn unique_file_names<'a>(entries: impl IntoIterator<Item = &'a ChapterEntry>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for entry in entries {
        let base = chapter_file_name(entry);
        let stem = base.strip_suffix(".pdf").unwrap_or(&base).to_string();

        let mut candidate = base.clone();
        let mut n = 2;
        while !taken.insert(candidate.to_lowercase()) {
            candidate = format!("{stem}_{n}.pdf");
            n += 1;
        }
        names.push(candidate);
    }

    names
}
