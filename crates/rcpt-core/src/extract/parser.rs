//! Rule-based receipt parser.

use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::receipt::{Category, ExtractedReceipt, FALLBACK_AMOUNT, UNKNOWN_VENDOR};

use super::rules::{
    categorize, AmountExtractor, AmountRule, DateExtractor, ExtractionMatch, FieldExtractor,
    VendorExtractor, VendorRule,
};
use super::ReceiptExtractor;

/// Which rules produced each field. `None` means a sentinel was used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionMatches {
    pub vendor: Option<(VendorRule, ExtractionMatch<String>)>,
    pub date: Option<ExtractionMatch<NaiveDate>>,
    pub amount: Option<(AmountRule, ExtractionMatch<Decimal>)>,
}

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt fields.
    pub receipt: ExtractedReceipt,
    /// Provenance of each field.
    pub matches: ExtractionMatches,
    /// One entry per field that fell back to a sentinel.
    pub warnings: Vec<String>,
    /// Overall confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// True if any field fell back to a sentinel.
    pub fn used_fallback(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Receipt parser built from ordered rule chains.
pub struct RuleBasedParser {
    vendors: VendorExtractor,
    dates: DateExtractor,
    amounts: AmountExtractor,
}

impl RuleBasedParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {
            vendors: VendorExtractor::new(),
            dates: DateExtractor::new(),
            amounts: AmountExtractor::new(),
        }
    }

    /// Parse `text`, using `now` as the transaction date if none is found.
    pub fn parse_at(&self, text: &str, now: NaiveDateTime) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut confidence = 1.0f32;

        info!("Parsing receipt from {} characters of text", text.len());

        let vendor_match = self.vendors.resolve(text);
        let vendor = match &vendor_match {
            Some((rule, m)) => {
                debug!("Vendor {:?} from {:?} rule", m.value, rule);
                m.value.clone()
            }
            None => {
                warn!("No vendor found, defaulting to {:?}", UNKNOWN_VENDOR);
                warnings.push("Could not extract vendor".to_string());
                confidence -= 0.2;
                UNKNOWN_VENDOR.to_string()
            }
        };

        let date_match = self.dates.extract(text);
        let transaction_date = match &date_match {
            Some(m) => m.value.and_time(NaiveTime::MIN),
            None => {
                warn!("No transaction date found, defaulting to current date");
                warnings.push("Could not extract transaction date".to_string());
                confidence -= 0.3;
                now
            }
        };

        let amount_match = self.amounts.resolve(text);
        let amount = match &amount_match {
            Some((rule, m)) => {
                debug!("Amount {} from {:?} rule", m.value, rule);
                m.value
            }
            None => {
                warn!("No valid positive amount found, defaulting to {}", FALLBACK_AMOUNT);
                warnings.push("Could not extract amount".to_string());
                confidence -= 0.4;
                FALLBACK_AMOUNT
            }
        };

        let category = categorize(text);
        if category == Category::Miscellaneous {
            debug!("No category keyword matched");
        }

        info!(
            "Parsed receipt: vendor={:?}, date={}, amount={}, category={}",
            vendor, transaction_date, amount, category
        );

        ExtractionResult {
            receipt: ExtractedReceipt {
                vendor,
                transaction_date,
                amount,
                category,
                extracted_text: text.to_string(),
            },
            matches: ExtractionMatches {
                vendor: vendor_match,
                date: date_match,
                amount: amount_match,
            },
            warnings,
            confidence: confidence.max(0.0),
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptExtractor for RuleBasedParser {
    fn extract(&self, text: &str) -> ExtractionResult {
        self.parse_at(text, Local::now().naive_local())
    }
}
