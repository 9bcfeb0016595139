//! TOC style detection from `word/styles.xml`.
//!
//! Word declares one paragraph style per TOC level ("toc 1", "toc 2", ...).
//! Their style ids differ between templates and locales, so placeholder rows
//! must look them up instead of hard-coding them.

use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Style id used for level 1 when nothing better is known.
pub const DEFAULT_TOC_STYLE: &str = "9";

/// TOC level -> paragraph style id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMapping(BTreeMap<u32, String>);

impl Default for StyleMapping {
    /// The ids Word assigns in a fresh default template.
    fn default() -> Self {
        Self::from_pairs([(1, "9"), (2, "11"), (3, "12")])
    }
}

impl StyleMapping {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(l, s)| (l, s.into())).collect())
    }

    pub fn get(&self, level: u32) -> Option<&str> {
        self.0.get(&level).map(String::as_str)
    }

    /// Style id for `level`, falling back to the level-1 style and then to
    /// [`DEFAULT_TOC_STYLE`].
    pub fn style_for(&self, level: u32) -> &str {
        self.get(level)
            .or_else(|| self.get(1))
            .unwrap_or(DEFAULT_TOC_STYLE)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(l, s)| (*l, s.as_str()))
    }
}

impl fmt::Display for StyleMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(l, s)| format!("{}={}", l, s)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

lazy_static! {
    static ref TOC_STYLE_NAME: Regex = Regex::new(r"(?i)^toc\s+(\d+)$").unwrap();
}

/// Value of the attribute whose local name is `local`, ignoring its prefix.
pub(crate) fn attr_value(element: &BytesStart, local: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

struct OpenStyle {
    id: Option<String>,
    is_paragraph: bool,
    name: Option<String>,
}

/// Scan a styles part for "toc N" paragraph styles.
///
/// Returns `None` when the part is absent or yields no TOC styles; callers
/// decide the fallback (usually `StyleMapping::default()`). If tokenizing
/// fails midway, the styles found before the error are kept.
pub fn detect_toc_styles(styles_xml: Option<&str>) -> Option<StyleMapping> {
    let xml = styles_xml?;
    let mut reader = Reader::from_str(xml);
    let mut found: BTreeMap<u32, String> = BTreeMap::new();
    let mut current: Option<OpenStyle> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"style" => {
                current = Some(OpenStyle {
                    id: attr_value(&e, b"styleId"),
                    is_paragraph: attr_value(&e, b"type").map_or(true, |t| t == "paragraph"),
                    name: None,
                });
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"name" => {
                if let Some(style) = current.as_mut() {
                    if style.name.is_none() {
                        style.name = attr_value(&e, b"val");
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"style" => {
                if let Some(style) = current.take() {
                    record_toc_style(&mut found, style);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!(
                    "styles.xml unreadable at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
    }

    if found.is_empty() {
        log::debug!("No TOC styles declared in styles.xml");
        None
    } else {
        Some(StyleMapping(found))
    }
}

fn record_toc_style(found: &mut BTreeMap<u32, String>, style: OpenStyle) {
    if !style.is_paragraph {
        return;
    }
    let (Some(id), Some(name)) = (style.id, style.name) else {
        return;
    };
    let Some(caps) = TOC_STYLE_NAME.captures(name.trim()) else {
        return;
    };
    if let Ok(level) = caps[1].parse::<u32>() {
        log::debug!("TOC level {} uses style {}", level, id);
        found.insert(level, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOC1"><w:name w:val="toc 1"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOC2"><w:name w:val="toc 2"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOCHeading"><w:name w:val="TOC Heading"/></w:style>
  <w:style w:type="character" w:styleId="TOC9Char"><w:name w:val="toc 9"/></w:style>
  <w:style w:styleId="31" w:type="paragraph" w:customStyle="1"><w:name w:val="TOC 3"/></w:style>
</w:styles>"#;

    #[test]
    fn test_detects_toc_styles() {
        let mapping = detect_toc_styles(Some(STYLES)).unwrap();
        assert_eq!(mapping.get(1), Some("TOC1"));
        assert_eq!(mapping.get(2), Some("TOC2"));
        assert_eq!(mapping.get(3), Some("31"));
        // Character styles and "TOC Heading" are not TOC levels
        assert_eq!(mapping.get(9), None);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_absent_or_empty_styles() {
        assert_eq!(detect_toc_styles(None), None);
        assert_eq!(detect_toc_styles(Some("<w:styles/>")), None);
        assert_eq!(
            detect_toc_styles(None).unwrap_or_default(),
            StyleMapping::from_pairs([(1, "9"), (2, "11"), (3, "12")])
        );
    }

    #[test]
    fn test_partial_mapping_falls_back_to_level_one() {
        let xml = r#"<w:styles>
            <w:style w:type="paragraph" w:styleId="A1"><w:name w:val="toc 1"/></w:style>
            <w:style w:type="paragraph" w:styleId="A3"><w:name w:val="toc 3"/></w:style>
        </w:styles>"#;
        let mapping = detect_toc_styles(Some(xml)).unwrap();
        assert_eq!(mapping.style_for(3), "A3");
        assert_eq!(mapping.style_for(2), "A1");
        assert_eq!(mapping.style_for(7), "A1");
    }

    #[test]
    fn test_empty_mapping_uses_builtin_style() {
        let mapping = StyleMapping::from_pairs(Vec::<(u32, String)>::new());
        assert_eq!(mapping.style_for(2), DEFAULT_TOC_STYLE);
    }

    #[test]
    fn test_malformed_styles_keep_what_was_found() {
        let xml = r#"<w:styles><w:style w:type="paragraph" w:styleId="T1"><w:name w:val="toc 1"/></w:style><w:style"#;
        let mapping = detect_toc_styles(Some(xml)).unwrap();
        assert_eq!(mapping.get(1), Some("T1"));
    }

    #[test]
    fn test_display() {
        assert_eq!(StyleMapping::default().to_string(), "{1=9, 2=11, 3=12}");
    }
}
