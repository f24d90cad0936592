//! Linear filters over receipt collections.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::InvalidArgument;
use crate::models::receipt::Receipt;

/// Text fields that can be searched by substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Vendor,
    Category,
    ExtractedText,
    Filename,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Vendor,
        SearchField::Category,
        SearchField::ExtractedText,
        SearchField::Filename,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Vendor => "vendor",
            SearchField::Category => "category",
            SearchField::ExtractedText => "extracted_text",
            SearchField::Filename => "filename",
        }
    }

    /// String representation of this field on `receipt`.
    pub fn value<'a>(&self, receipt: &'a Receipt) -> Cow<'a, str> {
        match self {
            SearchField::Vendor => Cow::Borrowed(&receipt.vendor),
            SearchField::Category => Cow::Borrowed(receipt.category.label()),
            SearchField::ExtractedText => Cow::Borrowed(&receipt.extracted_text),
            SearchField::Filename => Cow::Borrowed(&receipt.filename),
        }
    }
}

impl FromStr for SearchField {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                InvalidArgument::new("search field", s, "vendor, category, extracted_text, filename")
            })
    }
}

/// Keep receipts whose `field` contains `query`.
pub fn filter_by_substring(
    records: &[Receipt],
    query: &str,
    field: SearchField,
    case_sensitive: bool,
) -> Vec<Receipt> {
    if case_sensitive {
        records
            .iter()
            .filter(|r| field.value(r).contains(query))
            .cloned()
            .collect()
    } else {
        let query = query.to_lowercase();
        records
            .iter()
            .filter(|r| field.value(r).to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

/// Keep receipts with `min <= amount <= max`. Missing bounds are open.
pub fn filter_by_amount_range(
    records: &[Receipt],
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Vec<Receipt> {
    records
        .iter()
        .filter(|r| min.is_none_or(|min| r.amount >= min) && max.is_none_or(|max| r.amount <= max))
        .cloned()
        .collect()
}

/// Keep receipts with `start <= transaction_date <= end`. Missing bounds are open.
pub fn filter_by_date_range(
    records: &[Receipt],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<Receipt> {
    records
        .iter()
        .filter(|r| {
            start.is_none_or(|start| r.transaction_date >= start)
                && end.is_none_or(|end| r.transaction_date <= end)
        })
        .cloned()
        .collect()
}

/// Substring search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    pub query: String,
    pub field: SearchField,
    pub case_sensitive: bool,
}

/// A combined search, applied as keyword, then amount range, then date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keyword: Option<KeywordFilter>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, query: impl Into<String>, field: SearchField, case_sensitive: bool) -> Self {
        self.keyword = Some(KeywordFilter {
            query: query.into(),
            field,
            case_sensitive,
        });
        self
    }

    pub fn with_amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Run the query over `records`, preserving their order.
    pub fn apply(&self, records: &[Receipt]) -> Vec<Receipt> {
        let mut results = match &self.keyword {
            Some(k) => filter_by_substring(records, &k.query, k.field, k.case_sensitive),
            None => records.to_vec(),
        };

        if self.min_amount.is_some() || self.max_amount.is_some() {
            results = filter_by_amount_range(&results, self.min_amount, self.max_amount);
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            results = filter_by_date_range(&results, self.start_date, self.end_date);
        }

        results
    }
}
