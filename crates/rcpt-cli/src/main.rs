//! CLI application for receipt and bill processing.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, ingest, insights, parse, receipts, search};

/// Receipt OCR - extract, store and analyze receipts and bills
#[derive(Parser)]
#[command(name = "rcpt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a receipt without storing it
    Parse(parse::ParseArgs),

    /// Store one or more receipt files
    Ingest(ingest::IngestArgs),

    /// List stored receipts
    List(receipts::ListArgs),

    /// Show a stored receipt
    Show(receipts::ShowArgs),

    /// Edit the extracted fields of a stored receipt
    Edit(receipts::EditArgs),

    /// Delete a stored receipt and its source file
    Delete(receipts::DeleteArgs),

    /// Search stored receipts
    Search(search::SearchArgs),

    /// Show spend statistics
    Insights(insights::InsightsArgs),

    /// Show spend per month or year
    Trend(insights::TrendArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so stdout stays machine readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path),
        Commands::Ingest(args) => ingest::run(args, config_path),
        Commands::List(args) => receipts::list(args, config_path),
        Commands::Show(args) => receipts::show(args, config_path),
        Commands::Edit(args) => receipts::edit(args, config_path),
        Commands::Delete(args) => receipts::delete(args, config_path),
        Commands::Search(args) => search::run(args, config_path),
        Commands::Insights(args) => insights::insights(args, config_path),
        Commands::Trend(args) => insights::trend(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
