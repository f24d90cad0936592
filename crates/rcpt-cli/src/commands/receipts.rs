//! Commands over stored receipts: list, show, edit and delete.

use std::path::Path;

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use rcpt_core::analytics::{sort_receipts, SortKey, SortOrder};
use rcpt_core::models::receipt::{Category, ReceiptId, ReceiptUpdate};
use rcpt_core::ReceiptStore;

use super::{load_config, open_pipeline, open_store, parse_datetime};
use crate::output::{self, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Field to sort by
    #[arg(short, long, default_value = "transaction_date")]
    sort: SortKey,

    /// Sort order (asc or desc)
    #[arg(long, default_value = "desc")]
    order: SortOrder,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Receipt ID
    id: ReceiptId,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Receipt ID
    id: ReceiptId,

    /// New vendor name
    #[arg(long)]
    vendor: Option<String>,

    /// New transaction date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// New amount
    #[arg(long)]
    amount: Option<Decimal>,

    /// New category
    #[arg(long)]
    category: Option<Category>,
}

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Receipt ID
    id: ReceiptId,
}

pub fn list(args: ListArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let receipts = store.list_all()?;
    let sorted = sort_receipts(&receipts, args.sort, args.order.is_descending());
    println!("{}", output::receipts(&sorted, args.format)?);
    Ok(())
}

pub fn show(args: ShowArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let receipt = store.get(args.id)?;
    println!("{}", output::receipt(&receipt, args.format)?);
    Ok(())
}

pub fn edit(args: EditArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config)?;

    let update = ReceiptUpdate {
        vendor: args.vendor,
        transaction_date: args
            .date
            .as_deref()
            .map(|d| parse_datetime(d, false))
            .transpose()?,
        amount: args.amount,
        category: args.category,
    };

    if update.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one of --vendor, --date, --amount, --category.");
    }

    let receipt = store.update_fields(args.id, &update)?;
    println!(
        "{} Updated receipt #{}",
        style("✓").green(),
        receipt.id
    );
    println!("{}", output::receipt(&receipt, OutputFormat::Text)?);
    Ok(())
}

pub fn delete(args: DeleteArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut pipeline = open_pipeline(&config)?;

    let receipt = pipeline.delete(args.id)?;
    println!(
        "{} Deleted receipt #{} ({})",
        style("✓").green(),
        receipt.id,
        receipt.filename
    );
    Ok(())
}
