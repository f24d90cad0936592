//! Parse command - extract fields from a single receipt without storing it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rcpt_core::extract::{ExtractionResult, ReceiptExtractor, RuleBasedParser};
use rcpt_core::pipeline::{document_text, DocumentKind};
use rcpt_core::ocr;

use super::load_config;
use crate::output::{self, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (image, PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which rule produced each field
    #[arg(long)]
    explain: bool,
}

pub fn run(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = DocumentKind::from_path(&args.input)?;
    info!("Parsing {:?} file {}", kind, args.input.display());

    let data = fs::read(&args.input)?;
    let recognizer = ocr::recognizer(&config.ocr)?;
    let text = document_text(kind, &data, &recognizer, &config.pdf)?;

    let result = RuleBasedParser::new().extract(&text);
    let rendered = output::extracted(&result.receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    if args.explain {
        eprintln!();
        eprint!("{}", explain(&result));
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn explain(result: &ExtractionResult) -> String {
    let mut out = String::new();
    let unknown = style("fallback").yellow().to_string();

    let vendor = match &result.matches.vendor {
        Some((rule, m)) => format!("{:?} rule ({:.0}%)", rule, m.confidence * 100.0),
        None => unknown.clone(),
    };
    let date = match &result.matches.date {
        Some(m) => format!("matched {:?} ({:.0}%)", m.source, m.confidence * 100.0),
        None => unknown.clone(),
    };
    let amount = match &result.matches.amount {
        Some((rule, m)) => format!("{:?} rule on {:?} ({:.0}%)", rule, m.source, m.confidence * 100.0),
        None => unknown,
    };

    out.push_str(&format!("{} vendor: {}\n", style("ℹ").blue(), vendor));
    out.push_str(&format!("{} date:   {}\n", style("ℹ").blue(), date));
    out.push_str(&format!("{} amount: {}\n", style("ℹ").blue(), amount));
    for warning in &result.warnings {
        out.push_str(&format!("{} {}\n", style("!").yellow(), warning));
    }
    out.push_str(&format!(
        "{} Extraction confidence: {:.1}%\n",
        style("ℹ").blue(),
        result.confidence * 100.0
    ));
    out
}
