//! Subcommand implementations and the setup they share.

pub mod config;
pub mod ingest;
pub mod insights;
pub mod parse;
pub mod receipts;
pub mod search;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use rcpt_core::models::config::RcptConfig;
use rcpt_core::pipeline::{ReceiptPipeline, UploadDir};
use rcpt_core::{ocr, SqliteStore, TextRecognizer};

pub type Pipeline = ReceiptPipeline<SqliteStore, Box<dyn TextRecognizer>>;

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Load the config given with `--config`, else the default file if present.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<RcptConfig> {
    match config_path {
        Some(path) => RcptConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config {}", path.display());
                Ok(RcptConfig::from_file(&path)?)
            } else {
                Ok(RcptConfig::default())
            }
        }
    }
}

/// Resolve a storage path; relative paths live under the platform data dir.
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rcpt")
            .join(path)
    }
}

pub fn open_store(config: &RcptConfig) -> anyhow::Result<SqliteStore> {
    let path = resolve_data_path(&config.storage.database_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    SqliteStore::open(&path).with_context(|| format!("Open DB at {}", path.display()))
}

pub fn open_pipeline(config: &RcptConfig) -> anyhow::Result<Pipeline> {
    let store = open_store(config)?;
    let uploads = UploadDir::new(resolve_data_path(&config.storage.upload_dir))?;
    let recognizer = ocr::recognizer(&config.ocr)?;
    Ok(ReceiptPipeline::new(store, recognizer, uploads).with_pdf_config(config.pdf.clone()))
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`.
///
/// A bare date means the start of that day, or its end when `end_of_day`.
pub fn parse_datetime(value: &str, end_of_day: bool) -> anyhow::Result<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", value))?;
    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_bounds() {
        let start = parse_datetime("2024-01-31", false).unwrap();
        assert_eq!(start.to_string(), "2024-01-31 00:00:00");

        let end = parse_datetime("2024-01-31", true).unwrap();
        assert_eq!(end.to_string(), "2024-01-31 23:59:59.999999");

        let exact = parse_datetime("2024-01-31 12:30", true).unwrap();
        assert_eq!(exact.to_string(), "2024-01-31 12:30:00");

        assert!(parse_datetime("31/01/2024", false).is_err());
    }

    #[test]
    fn test_relative_storage_paths_resolve_under_data_dir() {
        let absolute = std::env::temp_dir().join("receipts.sqlite");
        assert_eq!(resolve_data_path(&absolute), absolute);

        let relative = resolve_data_path(Path::new("receipts.sqlite"));
        assert!(relative.ends_with("rcpt/receipts.sqlite"));
    }
}
