//! Locate empty TOC field results in `word/document.xml`.
//!
//! A complex field is written as `begin`, instruction text, `separate`, the
//! cached result, then `end`. A TOC inserted programmatically has never been
//! computed, so the paragraph closing with the `separate` marker is directly
//! followed by the paragraph opening with the `end` marker. That gap is where
//! placeholder rows belong.

use crate::toc_styles::attr_value;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::ops::Range;

const BOM: char = '\u{FEFF}';

/// Byte spans of a separate-paragraph and the end-paragraph that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPair {
    pub separate: Range<usize>,
    pub end: Range<usize>,
}

impl BoundaryPair {
    /// Offset right after the separate paragraph, where new rows go.
    pub fn insertion_point(&self) -> usize {
        self.separate.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldChar {
    Begin,
    Separate,
    End,
}

/// What a paragraph contains, in order, as far as field detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Field(FieldChar),
    Text,
}

#[derive(Debug)]
struct Paragraph {
    span: Range<usize>,
    tokens: Vec<Token>,
}

impl Paragraph {
    fn closes_with_separate(&self) -> bool {
        self.tokens.last() == Some(&Token::Field(FieldChar::Separate))
    }

    fn opens_with_end(&self) -> bool {
        self.tokens.first() == Some(&Token::Field(FieldChar::End))
    }
}

fn field_char(element: &BytesStart) -> Option<FieldChar> {
    match attr_value(element, b"fldCharType")?.as_str() {
        "begin" => Some(FieldChar::Begin),
        "separate" => Some(FieldChar::Separate),
        "end" => Some(FieldChar::End),
        _ => None,
    }
}

/// Collect every `w:p` with its byte span in `body` and its tokens. Nested
/// paragraphs (tables, text boxes) get their own entry; tokens go to the
/// innermost one.
///
/// Elements are matched by local name, like attributes. A leading byte-order
/// mark is skipped before tokenizing and the spans are re-based onto `body`,
/// since the reader does not count it in its position.
fn scan_paragraphs(body: &str) -> Result<Vec<Paragraph>, quick_xml::Error> {
    let (base, xml) = match body.strip_prefix(BOM) {
        Some(rest) => (BOM.len_utf8(), rest),
        None => (0, body),
    };
    let mut reader = Reader::from_str(xml);
    let mut open: Vec<Paragraph> = Vec::new();
    let mut closed: Vec<Paragraph> = Vec::new();

    loop {
        let before = base + reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = base + reader.buffer_position() as usize;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push(Paragraph {
                    span: before..before,
                    tokens: Vec::new(),
                }),
                b"t" => {
                    if let Some(p) = open.last_mut() {
                        p.tokens.push(Token::Text);
                    }
                }
                b"fldChar" => {
                    if let (Some(p), Some(kind)) = (open.last_mut(), field_char(&e)) {
                        p.tokens.push(Token::Field(kind));
                    }
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"fldChar" => {
                if let (Some(p), Some(kind)) = (open.last_mut(), field_char(&e)) {
                    p.tokens.push(Token::Field(kind));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"p" => {
                if let Some(mut p) = open.pop() {
                    p.span.end = after;
                    closed.push(p);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    closed.sort_by_key(|p| p.span.start);
    Ok(closed)
}

fn skip_xml_whitespace(body: &str, from: usize) -> usize {
    let rest = &body[from..];
    from + rest.len() - rest.trim_start_matches([' ', '\t', '\r', '\n']).len()
}

/// Find every separate-paragraph immediately followed by an end-paragraph.
///
/// Only whitespace may sit between the two paragraphs. A field whose result
/// already holds content does not match. If the body cannot be tokenized the
/// scan gives up and reports no boundaries.
pub fn find_toc_boundaries(body: &str) -> Vec<BoundaryPair> {
    let paragraphs = match scan_paragraphs(body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("document.xml could not be scanned for TOC fields: {}", e);
            return Vec::new();
        }
    };

    let by_start: HashMap<usize, &Paragraph> =
        paragraphs.iter().map(|p| (p.span.start, p)).collect();

    let pairs: Vec<BoundaryPair> = paragraphs
        .iter()
        .filter(|p| p.closes_with_separate())
        .filter_map(|sep| {
            let next = by_start.get(&skip_xml_whitespace(body, sep.span.end))?;
            next.opens_with_end().then(|| BoundaryPair {
                separate: sep.span.clone(),
                end: next.span.clone(),
            })
        })
        .collect();

    log::debug!(
        "{} paragraphs scanned, {} empty field results found",
        paragraphs.len(),
        pairs.len()
    );
    pairs
}
