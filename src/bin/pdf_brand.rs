//! Brand PDF documents with Title, Author, Creator and Producer metadata.
//!
//! Usage:
//!   pdf-brand document.pdf                      # in place
//!   pdf-brand input.pdf -o output.pdf           # new file
//!   pdf-brand report.pdf -t "Q4 Financial Analysis"
//!   pdf-brand *.pdf -q                          # batch, quiet

use anyhow::{Context, Result};
use clap::Parser;
use docsmith_toolkit::pdf_branding::{brand_pdf, Branding};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-brand", about = "Add branding metadata to PDF documents")]
struct Cli {
    /// Input PDF file(s) to process
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output PDF path (only for a single input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom title for the PDF
    #[arg(short, long)]
    title: Option<String>,

    /// Quiet mode (no status messages)
    #[arg(short, long)]
    quiet: bool,

    /// Author to record [default: Z.ai]
    #[arg(long, env = "PDF_BRAND_AUTHOR")]
    author: Option<String>,

    /// Creator to record [default: Z.ai]
    #[arg(long, env = "PDF_BRAND_CREATOR")]
    creator: Option<String>,

    /// Producer to record [default: http://z.ai]
    #[arg(long, env = "PDF_BRAND_PRODUCER")]
    producer: Option<String>,
}

// ─── Branding ───────────────────────────────────────────────────────────────

impl Cli {
    fn branding(&self) -> Branding {
        let defaults = Branding::default();
        Branding {
            author: self.author.clone().unwrap_or(defaults.author),
            creator: self.creator.clone().unwrap_or(defaults.creator),
            producer: self.producer.clone().unwrap_or(defaults.producer),
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<()> {
    if cli.output.is_some() && cli.input.len() > 1 {
        anyhow::bail!("--output can only be used with a single input file");
    }
    let branding = cli.branding();

    for input in &cli.input {
        let branded = brand_pdf(input, cli.output.as_deref(), cli.title.as_deref(), &branding)
            .with_context(|| format!("Failed to brand {}", input.display()))?;

        if !cli.quiet {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            println!("Updated metadata for: {}", name);
            println!("  Title: {}", branded.title);
            println!("  Author: {}", branding.author);
            println!("  Creator: {}", branding.creator);
            println!("  Producer: {}", branding.producer);
            if branded.output != *input {
                println!("  Output: {}", branded.output.display());
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}
