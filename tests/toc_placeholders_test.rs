//! Integration tests for TOC placeholder injection on real DOCX containers.
//!
//! Each test builds a small Word package in a temp directory, runs the same
//! entry point the `toc-placeholders` binary uses, and inspects the rewritten
//! archive member by member.

use docsmith_toolkit::package::Package;
use docsmith_toolkit::toc_placeholders::{add_toc_placeholders, PlaceholderEntry, DOCUMENT_PART};
use docsmith_toolkit::ToolkitError;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOC1"><w:name w:val="toc 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOC2"><w:name w:val="toc 2"/></w:style>
</w:styles>"#;

const TOC_FIELD: &str = r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText xml:space="preserve"> TOC \o "1-3" \h \z \u </w:instrText></w:r><w:r><w:fldChar w:fldCharType="separate"/></w:r></w:p><w:p><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#;

const IMAGE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

fn document(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Contents</w:t></w:r></w:p>{}<w:p><w:r><w:t>Body text</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#,
        inner
    )
}

/// Write a DOCX with the given parts; `None` skips the part.
fn write_docx(path: &Path, document_xml: Option<&str>, styles_xml: Option<&str>) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let deflated = SimpleFileOptions::default();
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", deflated).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    if let Some(xml) = document_xml {
        zip.start_file(DOCUMENT_PART, deflated).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    if let Some(xml) = styles_xml {
        zip.start_file("word/styles.xml", deflated).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.start_file("word/media/image1.png", stored).unwrap();
    zip.write_all(IMAGE).unwrap();
    zip.finish().unwrap();
}

fn fixture(dir: &tempfile::TempDir, document_xml: Option<&str>, styles_xml: Option<&str>) -> PathBuf {
    let path = dir.path().join("report.docx");
    write_docx(&path, document_xml, styles_xml);
    path
}

#[test]
fn test_fills_toc_in_place_and_keeps_other_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, Some(document(TOC_FIELD).as_str()), Some(STYLES));
    let before = Package::open(&path).unwrap();

    let entries = vec![
        PlaceholderEntry::new(1, "Introduction", "1"),
        PlaceholderEntry::new(2, "Scope & Method", "2"),
    ];
    let report = add_toc_placeholders(&path, Some(entries.as_slice())).unwrap();
    assert_eq!(report.fields_filled, 1);
    assert_eq!(report.entries, 2);
    assert!(report.styles_detected);
    assert_eq!(report.styles.get(1), Some("TOC1"));

    let after = Package::open(&path).unwrap();
    let names = |p: &Package| p.entries().iter().map(|e| e.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&before), names(&after));
    for name in ["[Content_Types].xml", "word/styles.xml", "word/media/image1.png"] {
        assert_eq!(before.part(name), after.part(name), "{} changed", name);
    }
    let image = after
        .entries()
        .iter()
        .find(|e| e.name == "word/media/image1.png")
        .unwrap();
    assert_eq!(image.compression, CompressionMethod::Stored);

    let body = after.part_text(DOCUMENT_PART).unwrap().unwrap();
    let separate = body.find(r#"w:fldCharType="separate""#).unwrap();
    let intro = body.find("<w:t>Introduction</w:t>").unwrap();
    let scope = body.find("<w:t>Scope &amp; Method</w:t>").unwrap();
    let end = body.find(r#"w:fldCharType="end""#).unwrap();
    assert!(separate < intro && intro < scope && scope < end);
    assert!(body.contains(r#"<w:pStyle w:val="TOC1"/>"#));
    assert!(body.contains(r#"<w:pStyle w:val="TOC2"/>"#));
    assert!(body.contains("<w:t>Body text</w:t>"));

    // Only the target file remains next to it.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_default_entries_and_builtin_styles() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, Some(document(TOC_FIELD).as_str()), None);

    let report = add_toc_placeholders(&path, None).unwrap();
    assert!(!report.styles_detected);
    assert_eq!(report.entries, PlaceholderEntry::samples().len());

    let body = Package::open(&path)
        .unwrap()
        .part_text(DOCUMENT_PART)
        .unwrap()
        .unwrap();
    assert!(body.contains("<w:t>Chapter 1 Overview</w:t>"));
    assert!(body.contains("<w:t>Chapter 2 Content</w:t>"));
    assert!(body.contains(r#"<w:pStyle w:val="9"/>"#));
    assert!(body.contains(r#"<w:pStyle w:val="11"/>"#));
}

#[test]
fn test_document_without_toc_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, Some(document("").as_str()), Some(STYLES));
    let original = std::fs::read(&path).unwrap();

    let report = add_toc_placeholders(&path, None).unwrap();
    assert_eq!(report.fields_filled, 0);
    assert_eq!(std::fs::read(&path).unwrap(), original);
}

#[test]
fn test_missing_document_part() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, None, Some(STYLES));
    let original = std::fs::read(&path).unwrap();

    let err = add_toc_placeholders(&path, None).unwrap_err();
    assert!(matches!(err, ToolkitError::MissingContent(ref part) if part == DOCUMENT_PART));
    assert_eq!(std::fs::read(&path).unwrap(), original);
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = add_toc_placeholders(&dir.path().join("absent.docx"), None).unwrap_err();
    assert!(matches!(err, ToolkitError::InputNotFound(_)));
}

#[test]
fn test_not_a_zip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.docx");
    std::fs::write(&path, b"plain text, not a package").unwrap();

    let err = add_toc_placeholders(&path, None).unwrap_err();
    assert!(matches!(err, ToolkitError::Packaging(_)));
    assert_eq!(std::fs::read(&path).unwrap(), b"plain text, not a package");
}
