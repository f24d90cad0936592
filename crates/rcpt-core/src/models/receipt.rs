//! Receipt data models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidArgument, ValidationError};

/// Store-assigned receipt identifier.
pub type ReceiptId = i64;

/// Vendor used when no vendor can be recovered from the text.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Amount used when no positive amount can be recovered (0.01).
pub const FALLBACK_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount accepted for a single receipt (one billion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Utilities,
    #[serde(rename = "Internet/Telecom")]
    InternetTelecom,
    Dining,
    Health,
    Miscellaneous,
}

impl Category {
    /// Every category, in keyword-matching order.
    pub const ALL: [Category; 6] = [
        Category::Groceries,
        Category::Utilities,
        Category::InternetTelecom,
        Category::Dining,
        Category::Health,
        Category::Miscellaneous,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Utilities => "Utilities",
            Category::InternetTelecom => "Internet/Telecom",
            Category::Dining => "Dining",
            Category::Health => "Health",
            Category::Miscellaneous => "Miscellaneous",
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Utilities => "utilities",
            Category::InternetTelecom => "internet_telecom",
            Category::Dining => "dining",
            Category::Health => "health",
            Category::Miscellaneous => "miscellaneous",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Miscellaneous
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || c.snake_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                InvalidArgument::new(
                    "category",
                    s,
                    "Groceries, Utilities, Internet/Telecom, Dining, Health, Miscellaneous",
                )
            })
    }
}

/// Structured fields recovered from a document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    /// Vendor or biller name.
    pub vendor: String,

    /// Transaction or billing date.
    pub transaction_date: NaiveDateTime,

    /// Total amount.
    pub amount: Decimal,

    /// Expense category.
    pub category: Category,

    /// Full source text.
    pub extracted_text: String,
}

impl ExtractedReceipt {
    /// Attach the source filename, producing a persistence candidate.
    pub fn into_new_receipt(self, filename: impl Into<String>) -> NewReceipt {
        NewReceipt {
            filename: filename.into(),
            vendor: self.vendor,
            transaction_date: self.transaction_date,
            amount: self.amount,
            category: self.category,
            extracted_text: self.extracted_text,
        }
    }
}

/// A receipt ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReceipt {
    pub filename: String,
    pub vendor: String,
    pub transaction_date: NaiveDateTime,
    pub amount: Decimal,
    pub category: Category,
    pub extracted_text: String,
}

impl NewReceipt {
    /// Check the persistence invariants, naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::new("filename", "must not be empty"));
        }
        validate_vendor(&self.vendor)?;
        validate_amount(self.amount)?;
        Ok(())
    }
}

/// A stored receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub filename: String,
    pub vendor: String,
    pub transaction_date: NaiveDateTime,
    pub amount: Decimal,
    pub category: Category,
    pub extracted_text: String,
    pub uploaded_at: NaiveDateTime,
}

impl Receipt {
    /// Build a stored receipt from a candidate.
    pub fn from_new(id: ReceiptId, receipt: NewReceipt, uploaded_at: NaiveDateTime) -> Self {
        Self {
            id,
            filename: receipt.filename,
            vendor: receipt.vendor,
            transaction_date: receipt.transaction_date,
            amount: receipt.amount,
            category: receipt.category,
            extracted_text: receipt.extracted_text,
            uploaded_at,
        }
    }
}

/// Partial edit of a stored receipt.
///
/// Only the extracted fields are editable; the source text and filename
/// are fixed once stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl ReceiptUpdate {
    /// True if no field would change.
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none()
            && self.transaction_date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
    }

    /// Validate the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(vendor) = &self.vendor {
            validate_vendor(vendor)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(())
    }

    /// Apply the present fields to a receipt.
    pub fn apply(&self, receipt: &mut Receipt) {
        if let Some(vendor) = &self.vendor {
            receipt.vendor = vendor.clone();
        }
        if let Some(date) = self.transaction_date {
            receipt.transaction_date = date;
        }
        if let Some(amount) = self.amount {
            receipt.amount = amount;
        }
        if let Some(category) = self.category {
            receipt.category = category;
        }
    }
}

fn validate_vendor(vendor: &str) -> Result<(), ValidationError> {
    if vendor.trim().is_empty() {
        return Err(ValidationError::new("vendor", "must not be empty"));
    }
    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::new(
            "amount",
            format!("must be greater than 0, got {}", amount),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::new(
            "amount",
            format!("must be at most {}, got {}", MAX_AMOUNT, amount),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate() -> NewReceipt {
        NewReceipt {
            filename: "receipt.txt".to_string(),
            vendor: "Kroger".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            amount: Decimal::new(1999, 2),
            category: Category::Groceries,
            extracted_text: "Kroger\nTOTAL 19.99".to_string(),
        }
    }

    #[test]
    fn test_fallback_amount_is_one_cent() {
        assert_eq!(FALLBACK_AMOUNT.to_string(), "0.01");
        assert!(FALLBACK_AMOUNT > Decimal::ZERO);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Internet/Telecom".parse::<Category>().unwrap(), Category::InternetTelecom);
        assert_eq!("internet_telecom".parse::<Category>().unwrap(), Category::InternetTelecom);
        assert_eq!("dining".parse::<Category>().unwrap(), Category::Dining);
        assert!("Travel".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::InternetTelecom).unwrap();
        assert_eq!(json, "\"Internet/Telecom\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::InternetTelecom);
    }

    #[test]
    fn test_validate_accepts_candidate() {
        assert!(candidate().validate().is_ok());
    }

    #[test]
    fn test_validate_names_offending_field() {
        let mut receipt = candidate();
        receipt.vendor = "   ".to_string();
        assert_eq!(receipt.validate().unwrap_err().field, "vendor");

        let mut receipt = candidate();
        receipt.amount = Decimal::ZERO;
        assert_eq!(receipt.validate().unwrap_err().field, "amount");

        let mut receipt = candidate();
        receipt.filename = String::new();
        assert_eq!(receipt.validate().unwrap_err().field, "filename");
    }

    #[test]
    fn test_validate_rejects_oversized_amount() {
        let mut receipt = candidate();
        receipt.amount = MAX_AMOUNT;
        assert!(receipt.validate().is_ok());

        receipt.amount = Decimal::MAX;
        assert_eq!(receipt.validate().unwrap_err().field, "amount");

        let update = ReceiptUpdate {
            amount: Some(MAX_AMOUNT + Decimal::new(1, 2)),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err().field, "amount");
    }

    #[test]
    fn test_update_apply_and_validate() {
        let mut receipt = Receipt::from_new(7, candidate(), candidate().transaction_date);
        let update = ReceiptUpdate {
            vendor: Some("Walmart".to_string()),
            amount: Some(Decimal::new(500, 2)),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.apply(&mut receipt);
        assert_eq!(receipt.vendor, "Walmart");
        assert_eq!(receipt.amount, Decimal::new(500, 2));
        assert_eq!(receipt.category, Category::Groceries);

        let bad = ReceiptUpdate {
            amount: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert_eq!(bad.validate().unwrap_err().field, "amount");
        assert!(ReceiptUpdate::default().is_empty());
    }
}
