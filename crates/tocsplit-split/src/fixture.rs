//! Synthetic PDF builder for tests.
//!
//! Pages hold left-aligned lines of Helvetica text at chosen sizes, enough
//! for MuPDF to report font sizes and for lopdf to split.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::SplitError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;

/// Lines of one page, top to bottom, each with a font size in points.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    lines: Vec<(String, i64)>,
}

impl FixturePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: &str, size: i64) -> Self {
        self.lines.push((text.to_string(), size));
        self
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;
        for (text, size) in &self.lines {
            y -= size + size / 2;
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec!["F1".into(), (*size).into()]));
            ops.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
            ops.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
            ops.push(Operation::new("ET", vec![]));
        }
        ops
    }
}

/// Build a document from `pages` with `info` as its Info dictionary
/// (omitted when empty).
pub fn build_pdf(pages: &[FixturePage], info: &[(&str, &str)]) -> Result<Document, SplitError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page in pages {
        let content = Content {
            operations: page.operations(),
        };
        let encoded = content
            .encode()
            .map_err(|e| SplitError::Io(std::io::Error::other(e.to_string())))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if !info.is_empty() {
        let mut dict = lopdf::Dictionary::new();
        for (key, value) in info {
            dict.set(*key, Object::string_literal(*value));
        }
        let info_id = doc.add_object(dict);
        doc.trailer.set("Info", info_id);
    }

    Ok(doc)
}

/// [`build_pdf`] and save to `path`.
pub fn write_pdf(
    path: &Path,
    pages: &[FixturePage],
    info: &[(&str, &str)],
) -> Result<(), SplitError> {
    let mut doc = build_pdf(pages, info)?;
    doc.compress();
    doc.save(path).map_err(|e| SplitError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}
