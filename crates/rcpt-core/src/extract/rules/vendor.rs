//! Vendor extraction.

use regex::Regex;

use super::patterns::{BARE_AMOUNT_LINE, BARE_DATE_LINE, VENDOR_GENERIC, VENDOR_KNOWN};
use super::{first_match, ExtractionMatch, FieldExtractor, Resolution};

/// Exclusive bounds on the character length of a fallback vendor line.
const MIN_LINE_CHARS: usize = 3;
const MAX_LINE_CHARS: usize = 30;

/// Which rule produced the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorRule {
    /// Matched a shop or vendor keyword.
    Keyword,
    /// First plausible line of the document.
    FirstLine,
}

/// Vendor field extractor.
pub struct VendorExtractor;

impl VendorExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the vendor together with the rule that produced it.
    pub fn resolve(&self, text: &str) -> Option<(VendorRule, ExtractionMatch<String>)> {
        if let Some(m) = match_keyword(text).into_option() {
            return Some((VendorRule::Keyword, m));
        }
        first_plausible_line(text)
            .into_option()
            .map(|m| (VendorRule::FirstLine, m))
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.resolve(text).map(|(_, m)| m)
    }
}

fn keyword_patterns() -> [&'static Regex; 2] {
    [&VENDOR_GENERIC, &VENDOR_KNOWN]
}

fn match_keyword(text: &str) -> Resolution<String> {
    first_match(keyword_patterns(), |pattern| {
        pattern
            .find(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().trim().to_string(), 0.8, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .into()
    })
}

fn first_plausible_line(text: &str) -> Resolution<String> {
    let mut offset = 0;
    for raw in text.split('\n') {
        let start = offset;
        offset += raw.len() + 1;

        let line = raw.trim();
        if line.is_empty() || BARE_DATE_LINE.is_match(line) || BARE_AMOUNT_LINE.is_match(line) {
            continue;
        }

        let chars = line.chars().count();
        if chars > MIN_LINE_CHARS && chars < MAX_LINE_CHARS {
            let line_start = start + (raw.len() - raw.trim_start().len());
            return Resolution::Matched(
                ExtractionMatch::new(line.to_string(), 0.5, line)
                    .with_position(line_start, line_start + line.len()),
            );
        }
    }
    Resolution::NoMatch
}
