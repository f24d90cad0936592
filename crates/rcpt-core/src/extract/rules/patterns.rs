//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Vendor keywords, tried in this order
    pub static ref VENDOR_GENERIC: Regex = Regex::new(
        r"(?i)supermarket|groceries|store|shop|cafe|restaurant|pharmacy|utility|internet|electricity"
    ).unwrap();

    pub static ref VENDOR_KNOWN: Regex = Regex::new(
        r"(?i)Walmart|Target|Kroger|Amazon|Starbucks|Local Cafe|Best Buy|Vodafone|Reliance Jio|BESCOM"
    ).unwrap();

    // Lines that can never be a vendor name
    pub static ref BARE_DATE_LINE: Regex = Regex::new(
        r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$"
    ).unwrap();

    pub static ref BARE_AMOUNT_LINE: Regex = Regex::new(
        r"^\d+\.\d{2}$"
    ).unwrap();

    // Date shapes: DD/MM/YYYY or MM/DD/YYYY
    pub static ref DATE_NUMERIC_DAY_FIRST: Regex = Regex::new(
        r"\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}"
    ).unwrap();

    // YYYY-MM-DD
    pub static ref DATE_NUMERIC_YEAR_FIRST: Regex = Regex::new(
        r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}"
    ).unwrap();

    // 15 Jan 2024, 15 January 2024
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"\b\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\w*\s+\d{2,4}\b"
    ).unwrap();

    // Jan 15, 2024
    pub static ref DATE_MONTH_NAME_DAY: Regex = Regex::new(
        r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\w*\s+\d{1,2},\s+\d{2,4}\b"
    ).unwrap();

    // Amounts. The captured number always ends in a 1-2 digit decimal part.
    pub static ref AMOUNT_KEYWORD: Regex = Regex::new(
        r"(?i)(?:TOTAL|AMOUNT|BALANCE|DUE)\s*:?\s*[$€£₹]?\s*(\d+(?:[.,]\d{3})*[.,]\d{1,2})"
    ).unwrap();

    pub static ref AMOUNT_CURRENCY_SYMBOL: Regex = Regex::new(
        r"[$€£₹]\s*(\d+(?:[.,]\d{3})*[.,]\d{1,2})"
    ).unwrap();

    pub static ref AMOUNT_CURRENCY_CODE: Regex = Regex::new(
        r"(?i)(\d+(?:[.,]\d{3})*[.,]\d{1,2})\s*(?:INR|USD|EUR|GBP)"
    ).unwrap();

    pub static ref AMOUNT_LINE_END: Regex = Regex::new(
        r"(?m)(\d+(?:[.,]\d{3})*[.,]\d{1,2})[ \t\r]*$"
    ).unwrap();
}
