//! Core library for receipt and bill processing.
//!
//! This crate provides:
//! - Rule-based extraction of vendor, date, amount and category from OCR text
//! - Search, ordering and spend statistics over stored receipts
//! - OCR via the Tesseract binary (or libtesseract with the `leptess` feature)
//! - PDF text/image extraction
//! - SQLite and in-memory receipt stores and an ingestion pipeline

pub mod analytics;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod store;

pub use error::{RcptError, Result};
pub use extract::{ExtractionResult, ReceiptExtractor, RuleBasedParser};
pub use models::config::RcptConfig;
pub use models::receipt::{Category, ExtractedReceipt, NewReceipt, Receipt, ReceiptId, ReceiptUpdate};
#[cfg(feature = "leptess")]
pub use ocr::LeptessRecognizer;
pub use ocr::{TesseractRecognizer, TextRecognizer};
pub use pipeline::{DocumentKind, Ingested, ReceiptPipeline, UploadDir};
pub use store::{MemoryStore, ReceiptStore, SqliteStore};
