//! Glyph sanitizing for PDF generation scripts.
//!
//! Fonts used for PDF rendering often lack superscript/subscript glyphs and
//! some math symbols. Scripts that embed them render boxes instead, so the
//! text is rewritten into markup the PDF layer understands (`<super>`,
//! `<sub>`) or, optionally, plain ASCII.

use crate::error::{Result, ToolkitError};
use crate::package::replace_file_atomically;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;

/// Options for [`sanitize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Replace math symbols such as `≤` with ASCII spellings.
    pub ascii_symbols: bool,
}

const SUPERSCRIPTS: &[(char, &str)] = &[
    ('⁰', "0"),
    ('¹', "1"),
    ('²', "2"),
    ('³', "3"),
    ('⁴', "4"),
    ('⁵', "5"),
    ('⁶', "6"),
    ('⁷', "7"),
    ('⁸', "8"),
    ('⁹', "9"),
    ('⁺', "+"),
    ('⁻', "-"),
    ('⁼', "="),
    ('⁽', "("),
    ('⁾', ")"),
    ('ⁿ', "n"),
    ('ᶦ', "i"),
];

const SUBSCRIPTS: &[(char, &str)] = &[
    ('₀', "0"),
    ('₁', "1"),
    ('₂', "2"),
    ('₃', "3"),
    ('₄', "4"),
    ('₅', "5"),
    ('₆', "6"),
    ('₇', "7"),
    ('₈', "8"),
    ('₉', "9"),
    ('₊', "+"),
    ('₋', "-"),
    ('₌', "="),
    ('₍', "("),
    ('₎', ")"),
    ('ₐ', "a"),
    ('ₑ', "e"),
    ('ₕ', "h"),
    ('ᵢ', "i"),
    ('ⱼ', "j"),
    ('ₖ', "k"),
    ('ₗ', "l"),
    ('ₘ', "m"),
    ('ₙ', "n"),
    ('ₒ', "o"),
    ('ₚ', "p"),
    ('ᵣ', "r"),
    ('ₛ', "s"),
    ('ₜ', "t"),
    ('ᵤ', "u"),
    ('ᵥ', "v"),
    ('ₓ', "x"),
];

const ASCII_SYMBOLS: &[(char, &str)] = &[
    ('±', "+/-"),
    ('×', "*"),
    ('÷', "/"),
    ('≤', "<="),
    ('≥', ">="),
    ('≠', "!="),
    ('≈', "~="),
    ('∞', "inf"),
];

lazy_static! {
    static ref ENTITY: Regex =
        Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[A-Za-z][A-Za-z0-9]{0,31};?)").unwrap();
    static ref BACKSLASH_ESCAPE: Regex =
        Regex::new(r"\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8}|\\x[0-9a-fA-F]{2}").unwrap();
    static ref SUPERSCRIPT_MAP: HashMap<char, &'static str> =
        SUPERSCRIPTS.iter().copied().collect();
    static ref SUBSCRIPT_MAP: HashMap<char, &'static str> = SUBSCRIPTS.iter().copied().collect();
    static ref SYMBOL_MAP: HashMap<char, &'static str> = ASCII_SYMBOLS.iter().copied().collect();
}

/// Named references HTML still honours without a trailing semicolon.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Numeric references 0x80..=0x9F are read as windows-1252, as browsers do.
/// 0x81, 0x8D, 0x8F, 0x90 and 0x9D have no windows-1252 glyph and pass
/// through.
const WINDOWS_1252: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Code points a numeric reference may not produce; they decode to nothing.
fn is_forbidden_code_point(code: u32) -> bool {
    matches!(code, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF)
        || (code & 0xFFFE == 0xFFFE && code <= 0x10FFFF)
}

fn resolve_numeric(num: &str) -> String {
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => num.parse::<u32>(),
    }
    .unwrap_or(u32::MAX);

    match code {
        0x00 => '\u{FFFD}'.to_string(),
        0x0D => '\r'.to_string(),
        0x80..=0x9F => WINDOWS_1252[(code - 0x80) as usize].to_string(),
        0xD800..=0xDFFF | 0x110000..=u32::MAX => '\u{FFFD}'.to_string(),
        c if is_forbidden_code_point(c) => String::new(),
        c => char::from_u32(c).map(String::from).unwrap_or_default(),
    }
}

/// Decode the text of one reference (everything after `&`). `None` leaves the
/// reference as written.
fn resolve_entity(reference: &str) -> Option<String> {
    if let Some(num) = reference.strip_prefix('#') {
        return Some(resolve_numeric(num.trim_end_matches(';')));
    }

    let (name, terminated) = match reference.strip_suffix(';') {
        Some(name) => (name, true),
        None => (reference, false),
    };
    if terminated {
        if let Some(value) = quick_xml::escape::resolve_html5_entity(name) {
            return Some(value.to_string());
        }
    }

    // Longest legacy entity at the start of the name; the rest stays text
    (2..=name.len()).rev().find_map(|len| {
        let prefix = name.get(..len)?;
        if !LEGACY_ENTITIES.contains(&prefix) {
            return None;
        }
        let value = quick_xml::escape::resolve_html5_entity(prefix)?;
        let rest = &reference[len..];
        Some(format!("{}{}", value, rest))
    })
}

/// Turn HTML entities and literal `\uXXXX`, `\UXXXXXXXX`, `\xXX` escapes
/// back into characters. Anything that does not decode is left as written.
pub fn restore_escapes(text: &str) -> String {
    let unescaped = ENTITY.replace_all(text, |caps: &Captures| {
        resolve_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    BACKSLASH_ESCAPE
        .replace_all(&unescaped, |caps: &Captures| {
            let esc = &caps[0];
            u32::from_str_radix(&esc[2..], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| esc.to_string())
        })
        .into_owned()
}

/// Rewrite superscript and subscript glyphs as `<super>`/`<sub>` markup.
pub fn replace_super_sub(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(base) = SUPERSCRIPT_MAP.get(&ch) {
            out.push_str("<super>");
            out.push_str(base);
            out.push_str("</super>");
        } else if let Some(base) = SUBSCRIPT_MAP.get(&ch) {
            out.push_str("<sub>");
            out.push_str(base);
            out.push_str("</sub>");
        } else {
            out.push(ch);
        }
    }
    out
}

/// Replace symbols from the ASCII fallback table. Markup tags are pure ASCII
/// and never contain a table key, so they pass through untouched.
pub fn fallback_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match SYMBOL_MAP.get(&ch) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(ch),
        }
    }
    out
}

/// Full pipeline: restore escapes, then super/subscripts, then (optionally)
/// the symbol fallback.
pub fn sanitize(text: &str, options: SanitizeOptions) -> String {
    let restored = restore_escapes(text);
    let marked = replace_super_sub(&restored);
    if options.ascii_symbols {
        fallback_symbols(&marked)
    } else {
        marked
    }
}

/// Sanitize a UTF-8 file in place. Returns whether its content changed; an
/// unchanged file is not rewritten.
pub fn sanitize_file(path: &Path, options: SanitizeOptions) -> Result<bool> {
    if !path.exists() {
        return Err(ToolkitError::InputNotFound(path.to_path_buf()));
    }
    let original = std::fs::read_to_string(path)?;
    let sanitized = sanitize(&original, options);
    if sanitized == original {
        log::debug!("{} needs no changes", path.display());
        return Ok(false);
    }
    replace_file_atomically(path, |staged| {
        std::fs::write(staged, sanitized.as_bytes())?;
        Ok(())
    })?;
    Ok(true)
}
