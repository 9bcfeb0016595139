//! Render a gift appraisal card as a self-contained HTML page.
//!
//! Usage:
//!   gift-report --product-name "Tea Set" --price "$120" --evaluation "..." \
//!     --thank-you-json '[{"style":"Warm","content":"Thank you!"}]' \
//!     --return-gift-json '[{"target":"Parents","item":"Honey","reason":"Healthy"}]' \
//!     --vibe-code standard --image-url photo.jpg --output-path out/card.html

use anyhow::{Context, Result};
use clap::Parser;
use docsmith_toolkit::gift_report::{generate_report, ReportRequest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gift-report", about = "Generate a gift appraisal HTML card")]
struct Cli {
    /// Product name shown as the card title
    #[arg(long, alias = "product_name")]
    product_name: String,

    /// Estimated price
    #[arg(long)]
    price: String,

    /// Appraisal text
    #[arg(long)]
    evaluation: String,

    /// JSON array of {style, content} reply suggestions
    #[arg(long, alias = "thank_you_json")]
    thank_you_json: String,

    /// JSON array of {target, item, reason} return-gift suggestions
    #[arg(long, alias = "return_gift_json")]
    return_gift_json: String,

    /// Card theme: luxury, standard or budget
    #[arg(long, alias = "vibe_code", default_value = "standard")]
    vibe_code: String,

    /// Product image URL or local path
    #[arg(long, alias = "image_url")]
    image_url: String,

    /// Where to write the HTML file
    #[arg(long, alias = "output_path", default_value = "gift_card_result.html")]
    output_path: PathBuf,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<()> {
    let request = ReportRequest {
        product_name: cli.product_name,
        price: cli.price,
        evaluation: cli.evaluation,
        thank_you_json: cli.thank_you_json,
        return_gift_json: cli.return_gift_json,
        vibe_code: cli.vibe_code,
        image_url: cli.image_url,
    };
    let path = generate_report(&request, &cli.output_path)
        .with_context(|| format!("Error saving HTML file: {}", cli.output_path.display()))?;
    println!("HTML Card generated successfully: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli)
}
