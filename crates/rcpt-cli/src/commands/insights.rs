//! Insights and trend commands - spend statistics over stored receipts.

use std::collections::BTreeMap;
use std::path::Path;

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use rcpt_core::analytics::{time_series, Granularity, Insights};
use rcpt_core::ReceiptStore;

use super::{load_config, open_store};
use crate::output::{self, OutputFormat};

/// Arguments for the insights command.
#[derive(Args)]
pub struct InsightsArgs {
    /// Number of top vendors to list (default from config)
    #[arg(short, long)]
    top: Option<usize>,

    /// Output format (json or text)
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for the trend command.
#[derive(Args)]
pub struct TrendArgs {
    /// Bucket size (month or year)
    #[arg(short, long, default_value = "month")]
    period: Granularity,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn insights(args: InsightsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let receipts = store.list_all()?;
    let top = args.top.unwrap_or(config.insights.top_vendors);
    let insights = Insights::compute(&receipts, top);

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&insights)?),
        OutputFormat::Csv => anyhow::bail!("CSV output is not available for insights; use json or text"),
        OutputFormat::Text => {
            if receipts.is_empty() {
                println!("{} No receipts stored yet.", style("ℹ").blue());
                return Ok(());
            }
            print!("{}", insights_text(&insights, receipts.len()));
        }
    }
    Ok(())
}

pub fn trend(args: TrendArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let series = time_series(&store.list_all()?, args.period);

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&series)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["period", "total"])?;
            for (period, total) in &series {
                let row: [&str; 2] = [period, &total.to_string()];
                wtr.write_record(row)?;
            }
            print!("{}", String::from_utf8(wtr.into_inner()?)?);
        }
        OutputFormat::Text => print!("{}", series_text(&series)),
    }
    Ok(())
}

fn insights_text(insights: &Insights, count: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Spend summary").bold()));
    out.push_str(&format!("  Receipts: {}\n", count));
    out.push_str(&format!("  Total:    {}\n", insights.total_spend));
    out.push_str(&format!("  Mean:     {}\n", insights.mean_spend.round_dp(2)));
    out.push_str(&format!("  Median:   {}\n", insights.median_spend));
    let modes: Vec<String> = insights.mode_spend.iter().map(|m| m.to_string()).collect();
    out.push_str(&format!("  Mode:     {}\n", modes.join(", ")));

    out.push_str(&format!("\n{}\n", style("Top vendors").bold()));
    for (vendor, n) in &insights.top_vendors {
        out.push_str(&format!("  {:<28} {:>5}\n", vendor, n));
    }

    out.push_str(&format!("\n{}\n", style("Categories").bold()));
    for (category, n) in &insights.category_distribution {
        out.push_str(&format!("  {:<28} {:>5}\n", category, n));
    }

    out.push_str(&format!("\n{}\n", style("Monthly spend").bold()));
    out.push_str(&series_text(&insights.monthly_spend_trend));

    out.push_str(&format!("\n{}\n", style("Yearly spend").bold()));
    out.push_str(&series_text(&insights.yearly_spend_trend));
    out
}

fn series_text(series: &BTreeMap<String, Decimal>) -> String {
    if series.is_empty() {
        return "  (no data)\n".to_string();
    }
    series
        .iter()
        .map(|(period, total)| format!("  {:<8} {:>12}\n", period, total.to_string()))
        .collect()
}
