//! Add placeholder rows to the table of contents of a DOCX file so the TOC
//! is not empty on first open. The file is replaced in place.
//!
//! Usage:
//!   toc-placeholders report.docx
//!   toc-placeholders report.docx --entries '[{"level":1,"text":"Introduction","page":"1"}]'
//!   toc-placeholders report.docx --entries-file toc.json

use anyhow::{Context, Result};
use clap::Parser;
use docsmith_toolkit::toc_placeholders::{add_toc_placeholders, parse_entries, PlaceholderEntry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "toc-placeholders",
    about = "Add placeholder entries to the table of contents of a DOCX file (in place)"
)]
struct Cli {
    /// DOCX file to modify (will be replaced)
    docx: PathBuf,

    /// JSON array of entries, e.g. '[{"level":1,"text":"Chapter 1","page":"1"}]'.
    /// An empty value means the built-in sample entries.
    #[arg(long, conflicts_with = "entries_file")]
    entries: Option<String>,

    /// File containing the entries JSON
    #[arg(long)]
    entries_file: Option<PathBuf>,
}

// ─── Entries ────────────────────────────────────────────────────────────────

/// Parse the requested entries before anything touches the document.
/// `None` selects the sample entries.
fn load_entries(cli: &Cli) -> Result<Option<Vec<PlaceholderEntry>>> {
    let json = match (&cli.entries, &cli.entries_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entries file: {}", path.display()))?,
        (None, None) => return Ok(None),
    };
    if json.is_empty() {
        return Ok(None);
    }
    let entries = parse_entries(&json).context("Error parsing entries JSON")?;
    Ok(Some(entries))
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<()> {
    let entries = load_entries(cli)?;

    let report = add_toc_placeholders(&cli.docx, entries.as_deref())
        .with_context(|| format!("Failed to add TOC placeholders to {}", cli.docx.display()))?;

    if report.fields_filled == 0 {
        println!(
            "No empty TOC field found in {}; file left unchanged",
            cli.docx.display()
        );
    } else {
        println!(
            "Successfully added {} TOC placeholders to {} ({} field(s), {} styles {})",
            report.entries,
            cli.docx.display(),
            report.fields_filled,
            if report.styles_detected { "detected" } else { "default" },
            report.styles
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_toolkit::package::Package;
    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;

    const BODY: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText> TOC \o "1-3" </w:instrText></w:r><w:r><w:fldChar w:fldCharType="separate"/></w:r></w:p><w:p><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p></w:body></w:document>"#;

    fn docx_with_toc(dir: &Path) -> PathBuf {
        let path = dir.join("report.docx");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(BODY.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("toc-placeholders").chain(args.iter().copied()))
    }

    #[test]
    fn test_bad_entries_fail_before_the_document_is_touched() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_with_toc(dir.path());
        let before = std::fs::read(&path).unwrap();

        for bad in ["not json", r#"[{"level":0,"text":"x"}]"#] {
            let err = run(&cli(&[path.to_str().unwrap(), "--entries", bad])).unwrap_err();
            assert!(format!("{:#}", err).contains("Error parsing entries JSON"));
            assert_eq!(std::fs::read(&path).unwrap(), before);
        }

        let missing = dir.path().join("missing.json");
        let args = [path.to_str().unwrap(), "--entries-file", missing.to_str().unwrap()];
        assert!(run(&cli(&args)).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_empty_entries_use_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_with_toc(dir.path());

        assert!(load_entries(&cli(&[path.to_str().unwrap(), "--entries", ""]))
            .unwrap()
            .is_none());
        run(&cli(&[path.to_str().unwrap(), "--entries", ""])).unwrap();

        let body = Package::open(&path)
            .unwrap()
            .part_text("word/document.xml")
            .unwrap()
            .unwrap();
        assert!(body.contains("<w:t>Chapter 1 Overview</w:t>"));
    }

    #[test]
    fn test_entries_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_with_toc(dir.path());
        let json = dir.path().join("toc.json");
        std::fs::write(&json, r#"[{"level":1,"text":"From file","page":4}]"#).unwrap();

        let entries = load_entries(&cli(&[
            path.to_str().unwrap(),
            "--entries-file",
            json.to_str().unwrap(),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(entries, vec![PlaceholderEntry::new(1, "From file", "4")]);
    }
}
