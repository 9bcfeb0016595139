//! Brand PDFs by rewriting their document-information dictionary.
//!
//! Sets Title, Author, Creator and Producer. Everything else in the file is
//! carried over as loaded.

use crate::error::{Result, ToolkitError};
use crate::package::replace_file_atomically;
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::path::{Path, PathBuf};

/// Metadata values written into every branded PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub author: String,
    pub creator: String,
    pub producer: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            author: "Z.ai".to_string(),
            creator: "Z.ai".to_string(),
            producer: "http://z.ai".to_string(),
        }
    }
}

/// Titles that generators write when they have nothing better.
const PLACEHOLDER_TITLES: &[&str] = &["(anonymous)", "unspecified"];

/// The four document-information fields this module manages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

/// Result of branding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandedPdf {
    pub output: PathBuf,
    pub title: String,
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Encode a text string; non-ASCII text is written as UTF-16BE with a BOM.
fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn info_dict(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// Read Title/Author/Creator/Producer from a loaded document.
pub fn metadata_of(doc: &Document) -> PdfMetadata {
    match info_dict(doc) {
        Some(dict) => PdfMetadata {
            title: info_text(dict, b"Title"),
            author: info_text(dict, b"Author"),
            creator: info_text(dict, b"Creator"),
            producer: info_text(dict, b"Producer"),
        },
        None => PdfMetadata::default(),
    }
}

/// Load a PDF and read its branding fields.
pub fn read_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(ToolkitError::InputNotFound(path.to_path_buf()));
    }
    let doc = Document::load(path)?;
    Ok(metadata_of(&doc))
}

/// Pick the title: explicit title, then a meaningful existing title, then the
/// file stem.
pub fn resolve_title(custom: Option<&str>, existing: Option<&str>, path: &Path) -> String {
    if let Some(title) = custom.filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    if let Some(title) = existing
        .map(str::trim)
        .filter(|t| !t.is_empty() && !PLACEHOLDER_TITLES.contains(t))
    {
        return title.to_string();
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write the four fields into the document's info dictionary, creating the
/// dictionary if the trailer has none.
pub fn apply_branding(doc: &mut Document, title: &str, branding: &Branding) -> Result<()> {
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let dict = match info_id {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => {
            // Direct or missing info dictionaries are replaced by an indirect one
            let existing = match doc.trailer.get(b"Info") {
                Ok(Object::Dictionary(d)) => d.clone(),
                _ => Dictionary::new(),
            };
            let id = doc.add_object(existing);
            doc.trailer.set("Info", Object::Reference(id));
            doc.get_object_mut(id)?.as_dict_mut()?
        }
    };

    dict.set("Title", encode_text(title));
    dict.set("Author", encode_text(&branding.author));
    dict.set("Creator", encode_text(&branding.creator));
    dict.set("Producer", encode_text(&branding.producer));
    Ok(())
}

/// Brand `input`, writing to `output` or back over `input` when `output` is
/// `None`. The destination is replaced only after the new file is complete.
pub fn brand_pdf(
    input: &Path,
    output: Option<&Path>,
    custom_title: Option<&str>,
    branding: &Branding,
) -> Result<BrandedPdf> {
    if !input.exists() {
        return Err(ToolkitError::InputNotFound(input.to_path_buf()));
    }
    let mut doc = Document::load(input)?;

    let existing = metadata_of(&doc).title;
    let title = resolve_title(custom_title, existing.as_deref(), input);
    apply_branding(&mut doc, &title, branding)?;

    let output = output.unwrap_or(input).to_path_buf();
    replace_file_atomically(&output, |staged| {
        doc.save(staged)?;
        Ok(())
    })?;
    log::info!("Branded {} (title {:?})", output.display(), title);

    Ok(BrandedPdf { output, title })
}
