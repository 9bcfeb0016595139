//! Placeholder rows for a freshly inserted, never-computed TOC field.
//!
//! Word shows an empty table of contents until the user updates fields. This
//! module writes rows styled like real TOC entries into the field result so
//! the document looks complete on first open; Word replaces them on the next
//! field update.

use crate::error::{Result, ToolkitError};
use crate::package::Package;
use crate::toc_field::find_toc_boundaries;
use crate::toc_styles::{detect_toc_styles, StyleMapping};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";

/// Right-aligned dot-leader tab position (twips) used by Word's default TOC
/// on an A4 page with standard margins.
pub const TOC_TAB_POSITION: u32 = 9026;

/// Left indent added per TOC level, in twips (0.25").
pub const INDENT_STEP: u32 = 360;

/// Deepest level with a defined indent.
pub const MAX_INDENTED_LEVEL: u32 = 6;

/// One placeholder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_page", deserialize_with = "page_label")]
    pub page: String,
}

fn default_level() -> u32 {
    1
}

fn default_page() -> String {
    "1".to_string()
}

/// Accept `"page": "3"` as well as `"page": 3`.
fn page_label<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "page must be a string or number, got {}",
            other
        ))),
    }
}

impl PlaceholderEntry {
    pub fn new(level: u32, text: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            page: page.into(),
        }
    }

    /// Generic rows used when the caller supplies none.
    pub fn samples() -> Vec<PlaceholderEntry> {
        vec![
            PlaceholderEntry::new(1, "Chapter 1 Overview", "1"),
            PlaceholderEntry::new(2, "Section 1.1 Details", "1"),
            PlaceholderEntry::new(2, "Section 1.2 More Details", "2"),
            PlaceholderEntry::new(1, "Chapter 2 Content", "3"),
        ]
    }
}

/// Parse a JSON array of entries, e.g.
/// `[{"level":1,"text":"Introduction","page":"1"}]`.
pub fn parse_entries(json: &str) -> Result<Vec<PlaceholderEntry>> {
    let entries: Vec<PlaceholderEntry> = serde_json::from_str(json)
        .map_err(|e| ToolkitError::MalformedRequest(format!("invalid entries JSON: {}", e)))?;
    if let Some((idx, _)) = entries.iter().enumerate().find(|(_, e)| e.level == 0) {
        return Err(ToolkitError::MalformedRequest(format!(
            "entry {} has level 0; levels start at 1",
            idx + 1
        )));
    }
    Ok(entries)
}

/// Left indent in twips for a TOC level. Levels past the table get none.
pub fn indent_for(level: u32) -> u32 {
    match level {
        1..=MAX_INDENTED_LEVEL => (level - 1) * INDENT_STEP,
        _ => 0,
    }
}

/// Make text safe inside `<w:t>`: drop characters XML 1.0 cannot carry and
/// escape markup characters.
pub fn escape_xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| !(c < ' ' && !matches!(c, '\t' | '\n' | '\r')))
        .filter(|&c| c != '\u{FFFE}' && c != '\u{FFFF}')
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

/// Render one entry as a Word TOC paragraph.
pub fn render_placeholder(entry: &PlaceholderEntry, styles: &StyleMapping) -> String {
    let style = styles.style_for(entry.level);
    let indent = indent_for(entry.level);
    let indent_attr = if indent > 0 {
        format!(r#"<w:ind w:left="{}"/>"#, indent)
    } else {
        String::new()
    };

    format!(
        r#"<w:p>
  <w:pPr>
    <w:pStyle w:val="{style}"/>
    {indent_attr}
    <w:tabs><w:tab w:val="right" w:leader="dot" w:pos="{pos}"/></w:tabs>
  </w:pPr>
  <w:r><w:t>{text}</w:t></w:r>
  <w:r><w:tab/></w:r>
  <w:r><w:t>{page}</w:t></w:r>
</w:p>"#,
        style = style,
        indent_attr = indent_attr,
        pos = TOC_TAB_POSITION,
        text = escape_xml_text(&entry.text),
        page = escape_xml_text(&entry.page),
    )
}

/// Render all entries in the order given, newline separated.
pub fn render_placeholders(entries: &[PlaceholderEntry], styles: &StyleMapping) -> String {
    entries
        .iter()
        .map(|e| render_placeholder(e, styles))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A document body with placeholder rows spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledBody {
    pub xml: String,
    /// Number of TOC fields that received rows.
    pub fields: usize,
}

/// Splice placeholder rows into every empty TOC field of `body`.
///
/// Returns `None` when the body has no empty TOC field; the body is then to
/// be left exactly as it is. The separate and end paragraphs are copied
/// through untouched.
pub fn insert_toc_placeholders(
    body: &str,
    entries: &[PlaceholderEntry],
    styles: &StyleMapping,
) -> Option<FilledBody> {
    let pairs = find_toc_boundaries(body);
    if pairs.is_empty() {
        return None;
    }

    let rows = render_placeholders(entries, styles);
    let mut xml = String::with_capacity(body.len() + rows.len() * pairs.len());
    let mut cursor = 0;
    for pair in &pairs {
        let at = pair.insertion_point();
        xml.push_str(&body[cursor..at]);
        xml.push_str(&rows);
        cursor = at;
    }
    xml.push_str(&body[cursor..]);

    Some(FilledBody {
        xml,
        fields: pairs.len(),
    })
}

/// Outcome of [`add_toc_placeholders`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionReport {
    /// Styles used for the rows.
    pub styles: StyleMapping,
    /// False when the built-in style ids were used.
    pub styles_detected: bool,
    /// TOC fields that received rows; 0 means the file was not rewritten.
    pub fields_filled: usize,
    /// Rows written per field.
    pub entries: usize,
}

/// Add placeholder rows to the TOC of the DOCX at `path`, in place.
///
/// With `entries` set to `None` the generic [`PlaceholderEntry::samples`]
/// are used. The file is only replaced after the new package has been fully
/// written; when no empty TOC field exists it is not rewritten at all.
pub fn add_toc_placeholders(
    path: &Path,
    entries: Option<&[PlaceholderEntry]>,
) -> Result<InjectionReport> {
    let samples;
    let entries = match entries {
        Some(e) => e,
        None => {
            samples = PlaceholderEntry::samples();
            &samples
        }
    };

    let mut package = Package::open(path)?;

    let styles_xml = match package.part_text(STYLES_PART) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring styles part: {}", e);
            None
        }
    };
    let detected = detect_toc_styles(styles_xml.as_deref());
    let styles_detected = detected.is_some();
    let styles = detected.unwrap_or_default();
    log::info!(
        "TOC styles {} ({})",
        styles,
        if styles_detected { "detected" } else { "built-in" }
    );

    let body = package
        .part_text(DOCUMENT_PART)?
        .ok_or_else(|| ToolkitError::MissingContent(DOCUMENT_PART.to_string()))?;

    let fields_filled = match insert_toc_placeholders(&body, entries, &styles) {
        Some(filled) => {
            package.replace_part(DOCUMENT_PART, filled.xml.into_bytes());
            package.save_atomic(path)?;
            log::info!(
                "Wrote {} placeholder rows into {} TOC field(s) of {}",
                entries.len(),
                filled.fields,
                path.display()
            );
            filled.fields
        }
        None => {
            log::warn!(
                "No empty TOC field in {}; file left unchanged",
                path.display()
            );
            0
        }
    };

    Ok(InjectionReport {
        styles,
        styles_detected,
        fields_filled,
        entries: entries.len(),
    })
}
