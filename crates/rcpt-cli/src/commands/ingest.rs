//! Ingest command - store receipt files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use rcpt_core::pipeline::DocumentKind;

use super::{load_config, open_pipeline};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of ingesting a single file.
struct IngestResult {
    path: PathBuf,
    outcome: Result<String, String>,
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expand glob patterns, keeping only supported files. Plain paths are kept
/// as given so that unsupported files are reported.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if is_pattern(input) {
            files.extend(
                glob(input)?
                    .filter_map(|r| r.ok())
                    .filter(|p| p.is_file() && DocumentKind::from_path(p).is_ok()),
            );
        } else {
            files.push(PathBuf::from(input));
        }
    }
    Ok(files)
}

pub fn run(args: IngestArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    let mut pipeline = open_pipeline(&config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match pipeline.ingest_file(&path) {
            Ok(ingested) => {
                let r = &ingested.receipt;
                pb.println(format!(
                    "{} {} -> #{} {} {} ({})",
                    style("✓").green(),
                    path.display(),
                    r.id,
                    r.vendor,
                    r.amount,
                    r.category
                ));
                for warning in &ingested.extraction.warnings {
                    pb.println(format!("  {} {}", style("!").yellow(), warning));
                }
                results.push(IngestResult {
                    path,
                    outcome: Ok(r.id.to_string()),
                });
            }
            Err(e) => {
                if args.continue_on_error {
                    warn!("Failed to ingest {}: {}", path.display(), e);
                    results.push(IngestResult {
                        path,
                        outcome: Err(e.to_string()),
                    });
                } else {
                    pb.abandon();
                    error!("Failed to ingest {}: {}", path.display(), e);
                    anyhow::bail!("Ingest failed for {}: {}", path.display(), e);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let stored = results.len() - failed.len();

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} stored, {} failed",
        style(stored).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(reason) = &result.outcome {
                println!("  - {}: {}", result.path.display(), reason);
            }
        }
    }

    Ok(())
}
