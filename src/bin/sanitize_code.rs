//! Sanitize a PDF generation script in place: restore escaped characters and
//! rewrite superscript/subscript glyphs as `<super>`/`<sub>` markup.
//!
//! Usage:
//!   sanitize-code make_report.py [--ascii-symbols]

use anyhow::{Context, Result};
use clap::Parser;
use docsmith_toolkit::sanitize::{sanitize_file, SanitizeOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sanitize-code", about = "Replace risky unicode glyphs in a script")]
struct Cli {
    /// Script to sanitize (rewritten in place)
    target: PathBuf,

    /// Also replace math symbols (±, ×, ≤, ...) with ASCII spellings
    #[arg(long)]
    ascii_symbols: bool,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = SanitizeOptions {
        ascii_symbols: cli.ascii_symbols,
    };
    let changed = sanitize_file(&cli.target, options)
        .with_context(|| format!("Failed to sanitize {}", cli.target.display()))?;
    if changed {
        println!("Sanitized: {}", cli.target.display());
    } else {
        println!("Sanitized: {} (no changes)", cli.target.display());
    }
    Ok(())
}
