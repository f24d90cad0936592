//! Search command - filter stored receipts.

use std::path::Path;

use clap::Args;
use rust_decimal::Decimal;

use rcpt_core::analytics::{sort_receipts, SearchField, SearchQuery, SortKey, SortOrder};
use rcpt_core::ReceiptStore;

use super::{load_config, open_store, parse_datetime};
use crate::output::{self, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Keyword to look for
    #[arg(short, long, requires = "field")]
    query: Option<String>,

    /// Field searched by --query (vendor, category, extracted_text, filename)
    #[arg(long, requires = "query")]
    field: Option<SearchField>,

    /// Match the keyword case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Minimum amount (inclusive)
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Maximum amount (inclusive)
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Earliest transaction date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<String>,

    /// Latest transaction date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<String>,

    /// Field to sort results by
    #[arg(short, long, default_value = "transaction_date")]
    sort: SortKey,

    /// Sort order (asc or desc)
    #[arg(long, default_value = "desc")]
    order: SortOrder,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SearchArgs {
    fn query(&self) -> anyhow::Result<SearchQuery> {
        let mut query = SearchQuery::new()
            .with_amount_range(self.min_amount, self.max_amount)
            .with_date_range(
                self.from.as_deref().map(|d| parse_datetime(d, false)).transpose()?,
                self.to.as_deref().map(|d| parse_datetime(d, true)).transpose()?,
            );
        if let (Some(keyword), Some(field)) = (&self.query, self.field) {
            query = query.with_keyword(keyword.clone(), field, self.case_sensitive);
        }
        Ok(query)
    }
}

pub fn run(args: SearchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let query = args.query()?;
    let matches = query.apply(&store.list_all()?);
    let sorted = sort_receipts(&matches, args.sort, args.order.is_descending());
    println!("{}", output::receipts(&sorted, args.format)?);
    Ok(())
}
