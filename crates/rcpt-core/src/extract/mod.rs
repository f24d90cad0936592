//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionMatches, ExtractionResult, RuleBasedParser};

/// Trait for receipt field extractors.
///
/// Extraction never fails: fields that cannot be recovered are replaced by
/// sentinels and reported in [`ExtractionResult::warnings`].
pub trait ReceiptExtractor {
    /// Extract receipt fields from raw document text.
    fn extract(&self, text: &str) -> ExtractionResult;
}
