//! Rendering receipts as JSON, CSV or plain text.

use console::style;
use serde::Serialize;

use rcpt_core::models::receipt::{ExtractedReceipt, Receipt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn receipts(receipts: &[Receipt], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(receipts),
        OutputFormat::Csv => receipts_csv(receipts),
        OutputFormat::Text => Ok(receipts_table(receipts)),
    }
}

pub fn receipt(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(receipt),
        OutputFormat::Csv => receipts_csv(std::slice::from_ref(receipt)),
        OutputFormat::Text => Ok(receipt_detail(receipt)),
    }
}

pub fn extracted(receipt: &ExtractedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(receipt),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["vendor", "transaction_date", "amount", "category"])?;
            let row: [&str; 4] = [
                &receipt.vendor,
                &receipt.transaction_date.format(DATETIME_FORMAT).to_string(),
                &receipt.amount.to_string(),
                receipt.category.label(),
            ];
            wtr.write_record(row)?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Vendor:   {}\n", receipt.vendor));
            output.push_str(&format!("Date:     {}\n", receipt.transaction_date.format(DATE_FORMAT)));
            output.push_str(&format!("Amount:   {}\n", receipt.amount));
            output.push_str(&format!("Category: {}\n", receipt.category));
            Ok(output)
        }
    }
}

fn receipts_csv(receipts: &[Receipt]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "filename",
        "vendor",
        "transaction_date",
        "amount",
        "category",
        "uploaded_at",
    ])?;

    for r in receipts {
        let row: [&str; 7] = [
            &r.id.to_string(),
            &r.filename,
            &r.vendor,
            &r.transaction_date.format(DATETIME_FORMAT).to_string(),
            &r.amount.to_string(),
            r.category.label(),
            &r.uploaded_at.format(DATETIME_FORMAT).to_string(),
        ];
        wtr.write_record(row)?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn receipts_table(receipts: &[Receipt]) -> String {
    if receipts.is_empty() {
        return "No receipts found.".to_string();
    }

    let mut output = format!(
        "{}\n",
        style(format!(
            "{:>5}  {:<10}  {:<28}  {:>12}  {:<16}  {}",
            "ID", "Date", "Vendor", "Amount", "Category", "File"
        ))
        .bold()
    );
    for r in receipts {
        output.push_str(&format!(
            "{:>5}  {:<10}  {:<28}  {:>12}  {:<16}  {}\n",
            r.id,
            r.transaction_date.format(DATE_FORMAT).to_string(),
            truncate(&r.vendor, 28),
            r.amount.to_string(),
            r.category.label(),
            r.filename
        ));
    }
    output.push_str(&format!("\n{} receipt(s)", receipts.len()));
    output
}

fn receipt_detail(r: &Receipt) -> String {
    let mut output = String::new();
    output.push_str(&format!("Receipt #{}\n", r.id));
    output.push_str(&format!("File:     {}\n", r.filename));
    output.push_str(&format!("Vendor:   {}\n", r.vendor));
    output.push_str(&format!("Date:     {}\n", r.transaction_date.format(DATETIME_FORMAT)));
    output.push_str(&format!("Amount:   {}\n", r.amount));
    output.push_str(&format!("Category: {}\n", r.category));
    output.push_str(&format!("Uploaded: {}\n", r.uploaded_at.format(DATETIME_FORMAT)));
    output.push('\n');
    output.push_str("Extracted text:\n");
    for line in r.extracted_text.lines() {
        output.push_str(&format!("  {}\n", line));
    }
    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rcpt_core::Category;
    use rust_decimal::Decimal;

    fn sample() -> Receipt {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Receipt {
            id: 3,
            filename: "r.txt".to_string(),
            vendor: "Acme, Inc".to_string(),
            transaction_date: date,
            amount: Decimal::new(1250, 2),
            category: Category::InternetTelecom,
            extracted_text: "Acme, Inc\nTotal 12.50".to_string(),
            uploaded_at: date,
        }
    }

    #[test]
    fn test_csv_quotes_fields() {
        let csv = receipts(&[sample()], OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,filename,vendor,transaction_date,amount,category,uploaded_at"
        );
        assert_eq!(
            lines.next().unwrap(),
            "3,r.txt,\"Acme, Inc\",2024-05-01 00:00:00,12.50,Internet/Telecom,2024-05-01 00:00:00"
        );
    }

    #[test]
    fn test_json_uses_category_label() {
        let json = receipt(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["category"], "Internet/Telecom");
        assert_eq!(value["id"], 3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long vendor name", 6), "a ver…");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(receipts(&[], OutputFormat::Text).unwrap(), "No receipts found.");
    }
}
