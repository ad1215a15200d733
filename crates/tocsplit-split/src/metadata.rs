use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

/// Info dictionary entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub entries: Vec<(String, String)>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Info dictionary entries of `doc`.
///
/// A missing or malformed Info dictionary yields empty metadata rather
/// than an error.
pub fn document_metadata(doc: &Document) -> DocumentMetadata {
    let Some(dict) = info_dictionary(doc) else {
        tracing::debug!("document has no Info dictionary");
        return DocumentMetadata::default();
    };

    let entries = dict
        .iter()
        .filter_map(|(key, value)| {
            let key = String::from_utf8_lossy(key).trim_start_matches('/').to_string();
            let value = match value {
                Object::Reference(id) => doc.get_object(*id).ok().and_then(object_text),
                other => object_text(other),
            }?;
            Some((key, value))
        })
        .collect();

    DocumentMetadata { entries }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    match info {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when it starts with a byte order mark,
/// otherwise treated as (lossy) UTF-8.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units).trim().to_string();
    }
    String::from_utf8_lossy(bytes).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PdfSplitter;
    use crate::fixture::{FixturePage, write_pdf};

    #[test]
    fn reads_info_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        write_pdf(
            &path,
            &[FixturePage::new().line("Hello", 12)],
            &[("Title", "A Book"), ("Author", "Someone"), ("Producer", "tests")],
        )
        .unwrap();

        let metadata = PdfSplitter::open(&path).unwrap().metadata();
        assert_eq!(
            metadata.entries,
            vec![
                ("Title".to_string(), "A Book".to_string()),
                ("Author".to_string(), "Someone".to_string()),
                ("Producer".to_string(), "tests".to_string()),
            ]
        );
        assert_eq!(metadata.get("Author"), Some("Someone"));
    }

    #[test]
    fn missing_info_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.pdf");
        write_pdf(&path, &[FixturePage::new().line("Hello", 12)], &[]).unwrap();
        assert!(PdfSplitter::open(&path).unwrap().metadata().is_empty());
    }

    #[test]
    fn decodes_utf16_strings() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Café".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&bytes), "Café");
        assert_eq!(decode_text_string(b" plain "), "plain");
    }
}
