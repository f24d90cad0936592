//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for rcpt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Storage locations.
    pub storage: StorageConfig,

    /// Insight report configuration.
    pub insights: InsightsConfig,
}

/// Which Tesseract integration runs the recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// Run the `tesseract` binary.
    #[default]
    Command,
    /// Link libtesseract through `leptess` (requires the `leptess` feature).
    Leptess,
}

/// Tesseract OCR configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract integration to use.
    pub engine: OcrEngine,

    /// Path or name of the tesseract binary.
    pub tesseract_cmd: PathBuf,

    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    pub language: String,

    /// Convert images to grayscale before recognition.
    pub grayscale: bool,

    /// Tesseract page segmentation mode (--psm), engine default if unset.
    pub page_segmentation_mode: Option<u8>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngine::Command,
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            grayscale: true,
            page_segmentation_mode: None,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum embedded text length to skip OCR.
    pub min_text_length: usize,

    /// OCR embedded page images when a PDF has too little text.
    pub ocr_scanned_pages: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            ocr_scanned_pages: true,
        }
    }
}

/// Storage locations. Relative paths are resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Directory holding uploaded source files.
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("receipts.sqlite"),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Insight report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Number of vendors listed in the top-vendors table.
    pub top_vendors: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self { top_vendors: 5 }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
