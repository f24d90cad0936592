//! Error types for the rcpt-core library.

use thiserror::Error;

use crate::models::receipt::ReceiptId;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Storage collaborator error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Candidate record rejected at the persistence boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Caller supplied an unrecognized selector or option.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Text document is not valid UTF-8.
    #[error("text document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File type is not handled by the pipeline.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    /// A source file with the same name is already stored.
    #[error("a file named {0:?} has already been uploaded")]
    DuplicateFile(String),
}

/// Errors raised by the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine is not installed or could not be started.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but failed to recognize the image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The image could not be decoded or prepared.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by receipt stores.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No receipt with the given identifier.
    #[error("receipt {0} not found")]
    NotFound(ReceiptId),

    /// Another receipt already uses this filename.
    #[error("a receipt for file {0:?} already exists")]
    DuplicateFilename(String),

    /// The record failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A stored row could not be decoded.
    #[error("receipt {id} is corrupt: {reason}")]
    Corrupt { id: ReceiptId, reason: String },

    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A record field violated the persistence invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// An unrecognized field name, sort key, granularity or category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {argument} {value:?}, expected one of: {expected}")]
pub struct InvalidArgument {
    pub argument: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl InvalidArgument {
    pub fn new(argument: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            argument,
            value: value.into(),
            expected,
        }
    }
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
