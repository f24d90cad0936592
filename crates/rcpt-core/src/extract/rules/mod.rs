//! Rule-based field extractors for receipts and bills.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod patterns;
pub mod vendor;

pub use amounts::{normalize_amount, AmountExtractor, AmountRule};
pub use category::categorize;
pub use dates::{DateExtractor, DATE_FORMATS};
pub use vendor::{VendorExtractor, VendorRule};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Outcome of one rule in a fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Matched(ExtractionMatch<T>),
    NoMatch,
}

impl<T> Resolution<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    pub fn into_option(self) -> Option<ExtractionMatch<T>> {
        match self {
            Resolution::Matched(m) => Some(m),
            Resolution::NoMatch => None,
        }
    }
}

impl<T> From<Option<ExtractionMatch<T>>> for Resolution<T> {
    fn from(value: Option<ExtractionMatch<T>>) -> Self {
        value.map_or(Resolution::NoMatch, Resolution::Matched)
    }
}

/// Evaluate `rules` in order, returning the first one that matches.
pub fn first_match<R, T>(
    rules: impl IntoIterator<Item = R>,
    mut attempt: impl FnMut(R) -> Resolution<T>,
) -> Resolution<T> {
    for rule in rules {
        if let Resolution::Matched(m) = attempt(rule) {
            return Resolution::Matched(m);
        }
    }
    Resolution::NoMatch
}
