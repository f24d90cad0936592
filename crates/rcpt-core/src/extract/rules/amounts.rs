//! Total amount extraction.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::{AMOUNT_CURRENCY_CODE, AMOUNT_CURRENCY_SYMBOL, AMOUNT_KEYWORD, AMOUNT_LINE_END};
use super::{first_match, ExtractionMatch, FieldExtractor, Resolution};

/// Amount patterns in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    /// "TOTAL", "AMOUNT", "BALANCE" or "DUE" followed by a number.
    Keyword,
    /// Number prefixed by a currency symbol.
    CurrencySymbol,
    /// Number followed by a currency code.
    CurrencyCode,
    /// Number at the end of a line.
    LineEnd,
}

impl AmountRule {
    pub const ALL: [AmountRule; 4] = [
        AmountRule::Keyword,
        AmountRule::CurrencySymbol,
        AmountRule::CurrencyCode,
        AmountRule::LineEnd,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            AmountRule::Keyword => &AMOUNT_KEYWORD,
            AmountRule::CurrencySymbol => &AMOUNT_CURRENCY_SYMBOL,
            AmountRule::CurrencyCode => &AMOUNT_CURRENCY_CODE,
            AmountRule::LineEnd => &AMOUNT_LINE_END,
        }
    }

    fn confidence(&self) -> f32 {
        match self {
            AmountRule::Keyword => 0.95,
            AmountRule::CurrencySymbol => 0.85,
            AmountRule::CurrencyCode => 0.8,
            AmountRule::LineEnd => 0.5,
        }
    }

    /// Apply this rule: the last match wins, and it must be a positive number.
    fn attempt(&self, text: &str) -> Resolution<Decimal> {
        let Some(caps) = self.pattern().captures_iter(text).last() else {
            return Resolution::NoMatch;
        };
        let Some(number) = caps.get(1) else {
            return Resolution::NoMatch;
        };

        match normalize_amount(number.as_str()) {
            Some(amount) if amount > Decimal::ZERO => Resolution::Matched(
                ExtractionMatch::new(amount, self.confidence(), number.as_str())
                    .with_position(number.start(), number.end()),
            ),
            _ => {
                debug!("{:?} amount {:?} is not a positive number", self, number.as_str());
                Resolution::NoMatch
            }
        }
    }
}

/// Amount field extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the amount together with the rule that produced it.
    pub fn resolve(&self, text: &str) -> Option<(AmountRule, ExtractionMatch<Decimal>)> {
        let mut winner = None;
        let resolution = first_match(AmountRule::ALL, |rule| {
            let attempt = rule.attempt(text);
            if attempt.is_matched() {
                winner = Some(rule);
            }
            attempt
        });
        winner.zip(resolution.into_option())
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.resolve(text).map(|(_, m)| m)
    }
}

/// Parse a matched amount such as "45.00", "45,00", "1,234.56" or "1.234,56".
///
/// The last separator is the decimal separator; earlier ones group thousands.
pub fn normalize_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match cleaned.rfind([',', '.']) {
        Some(pos) => {
            let integer_part: String = cleaned[..pos].chars().filter(|c| c.is_ascii_digit()).collect();
            format!("{}.{}", integer_part, &cleaned[pos + 1..])
        }
        None => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
