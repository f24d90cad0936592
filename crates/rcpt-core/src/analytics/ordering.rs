//! Stable ordering of receipt collections by a named field.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::InvalidArgument;
use crate::models::receipt::Receipt;

const DATE_SORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Field a receipt collection can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Vendor,
    TransactionDate,
    Amount,
    Category,
    Filename,
    UploadedAt,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Id,
        SortKey::Vendor,
        SortKey::TransactionDate,
        SortKey::Amount,
        SortKey::Category,
        SortKey::Filename,
        SortKey::UploadedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Vendor => "vendor",
            SortKey::TransactionDate => "transaction_date",
            SortKey::Amount => "amount",
            SortKey::Category => "category",
            SortKey::Filename => "filename",
            SortKey::UploadedAt => "uploaded_at",
        }
    }

    /// Typed value of this key on `receipt`.
    pub fn value(&self, receipt: &Receipt) -> SortValue {
        match self {
            SortKey::Id => SortValue::Number(Decimal::from(receipt.id)),
            SortKey::Amount => SortValue::Number(receipt.amount),
            SortKey::Vendor => SortValue::Text(receipt.vendor.clone()),
            SortKey::Category => SortValue::Text(receipt.category.label().to_string()),
            SortKey::Filename => SortValue::Text(receipt.filename.clone()),
            SortKey::TransactionDate => {
                SortValue::Text(receipt.transaction_date.format(DATE_SORT_FORMAT).to_string())
            }
            SortKey::UploadedAt => {
                SortValue::Text(receipt.uploaded_at.format(DATE_SORT_FORMAT).to_string())
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                InvalidArgument::new(
                    "sort key",
                    s,
                    "id, vendor, transaction_date, amount, category, filename, uploaded_at",
                )
            })
    }
}

/// A sortable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(Decimal),
    Text(String),
}

impl SortValue {
    fn as_number(&self) -> Decimal {
        match self {
            SortValue::Number(n) => *n,
            SortValue::Text(_) => Decimal::ZERO,
        }
    }

    fn as_text(&self) -> String {
        match self {
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_descending(&self) -> bool {
        matches!(self, SortOrder::Desc)
    }
}

impl FromStr for SortOrder {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(InvalidArgument::new("sort order", s, "asc, desc")),
        }
    }
}

/// Return `records` ordered by `key`.
///
/// The comparison kind is taken from the first record: numeric keys compare
/// as numbers, everything else compares as text. The sort is stable in both
/// directions, so equal keys keep their input order.
pub fn sort_receipts(records: &[Receipt], key: SortKey, descending: bool) -> Vec<Receipt> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let numeric = matches!(key.value(first), SortValue::Number(_));

    let mut keyed: Vec<(SortValue, &Receipt)> = records.iter().map(|r| (key.value(r), r)).collect();

    let compare = |a: &SortValue, b: &SortValue| -> Ordering {
        if numeric {
            a.as_number().cmp(&b.as_number())
        } else {
            a.as_text().cmp(&b.as_text())
        }
    };

    if descending {
        keyed.sort_by(|(a, _), (b, _)| compare(b, a));
    } else {
        keyed.sort_by(|(a, _), (b, _)| compare(a, b));
    }

    keyed.into_iter().map(|(_, r)| r.clone()).collect()
}
