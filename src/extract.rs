// Pure Rust PDF access: loading, per-page text, metadata, structure probes
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Result, TriageError};

/// A loaded PDF with its page table cached. Constructed fresh per run.
pub struct PdfFile {
    pub name: String,
    pub path: PathBuf,
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfFile {
    pub fn load(path: &Path) -> Result<Self> {
        let doc = Document::load(path)?;
        let pages = doc.get_pages();
        Ok(Self {
            name: pdf_stem(path),
            path: path.to_path_buf(),
            doc,
            pages,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// 1-based page numbers in document order.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn page_dict(&self, page_number: u32) -> Result<&Dictionary> {
        let id = self.pages.get(&page_number).ok_or_else(|| TriageError::Render {
            page: page_number,
            reason: "page not found".to_string(),
        })?;
        Ok(self.doc.get_object(*id)?.as_dict()?)
    }
}

/// File stem used as the document name and its output subdirectory.
pub fn pdf_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Text content of one page. Empty text is valid, not an error.
pub fn page_text(pdf: &PdfFile, page_number: u32) -> Result<String> {
    let mut text = pdf
        .doc()
        .extract_text(&[page_number])
        .map_err(|e| TriageError::Extraction {
            page: page_number,
            reason: e.to_string(),
        })?;
    // extract_text terminates each page with a newline that is not content
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Document Info dictionary as a string map. Unknown keys pass through
/// opaquely under their PDF names; an absent or malformed Info dictionary
/// yields an empty map.
pub fn document_metadata(pdf: &PdfFile) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let Ok(info) = pdf.doc().trailer.get(b"Info") else {
        return metadata;
    };
    let Some(dict) = resolve_dict(pdf.doc(), info) else {
        return metadata;
    };
    for (key, value) in dict.iter() {
        if let Some(text) = object_to_string(pdf.doc(), value) {
            metadata.insert(String::from_utf8_lossy(key).into_owned(), text);
        }
    }
    metadata
}

/// Whether a page declares font resources. A font entry implies a real text
/// layer, which marks the document as vector-dominant.
pub fn page_has_fonts(pdf: &PdfFile, page_number: u32) -> bool {
    let Ok(page) = pdf.page_dict(page_number) else {
        return false;
    };
    let Some(resources) = page_resources(pdf.doc(), page) else {
        return false;
    };
    match resources.get(b"Font") {
        Ok(font) => resolve_dict(pdf.doc(), font).is_some_and(|d| !d.is_empty()),
        Err(_) => false,
    }
}

/// Resources for a page, following the Parent chain for inherited entries.
pub(crate) fn page_resources<'a>(doc: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut current = page;
    loop {
        if let Ok(resources) = current.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        match current.get(b"Parent") {
            Ok(Object::Reference(id)) => current = doc.get_dictionary(*id).ok()?,
            _ => return None,
        }
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        },
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_to_string(doc: &Document, object: &Object) -> Option<String> {
    let resolved = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match resolved {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(value) => Some(value.to_string()),
        Object::Real(value) => Some(value.to_string()),
        Object::Boolean(value) => Some(value.to_string()),
        _ => None,
    }
}

/// PDF text strings are UTF-16BE when BOM-prefixed, PDFDocEncoding (treated
/// as Latin-1 here) otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
