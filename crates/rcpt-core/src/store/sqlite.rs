//! SQLite-backed receipt store.

use std::path::Path;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{ReceiptStore, Result};
use crate::error::StorageError;
use crate::models::receipt::{Category, NewReceipt, Receipt, ReceiptId, ReceiptUpdate};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS receipts(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    vendor TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    amount TEXT NOT NULL,
    category TEXT NOT NULL,
    extracted_text TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_receipts_transaction_date ON receipts(transaction_date);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, filename, vendor, transaction_date, amount, category, extracted_text, uploaded_at FROM receipts";

/// Receipt store persisted in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

/// A row as stored, before the text columns are decoded.
struct StoredRow {
    id: ReceiptId,
    filename: String,
    vendor: String,
    transaction_date: NaiveDateTime,
    amount: String,
    category: String,
    extracted_text: String,
    uploaded_at: NaiveDateTime,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            filename: row.get(1)?,
            vendor: row.get(2)?,
            transaction_date: row.get(3)?,
            amount: row.get(4)?,
            category: row.get(5)?,
            extracted_text: row.get(6)?,
            uploaded_at: row.get(7)?,
        })
    }

    fn into_receipt(self) -> Result<Receipt> {
        let amount = Decimal::from_str(&self.amount).map_err(|e| StorageError::Corrupt {
            id: self.id,
            reason: format!("amount {:?}: {}", self.amount, e),
        })?;
        let category = Category::from_str(&self.category).map_err(|e| StorageError::Corrupt {
            id: self.id,
            reason: e.to_string(),
        })?;

        Ok(Receipt {
            id: self.id,
            filename: self.filename,
            vendor: self.vendor,
            transaction_date: self.transaction_date,
            amount,
            category,
            extracted_text: self.extracted_text,
            uploaded_at: self.uploaded_at,
        })
    }
}

impl SqliteStore {
    /// Open (creating if needed) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!("Opened receipt database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn fetch(&self, id: ReceiptId) -> Result<Receipt> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                StoredRow::from_row,
            )
            .optional()?;
        row.ok_or(StorageError::NotFound(id))?.into_receipt()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl ReceiptStore for SqliteStore {
    fn insert(&mut self, receipt: NewReceipt) -> Result<ReceiptId> {
        receipt.validate()?;
        let uploaded_at = Local::now().naive_local();

        let inserted = self.conn.execute(
            "INSERT INTO receipts(filename, vendor, transaction_date, amount, category, extracted_text, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                receipt.filename,
                receipt.vendor,
                receipt.transaction_date,
                receipt.amount.to_string(),
                receipt.category.label(),
                receipt.extracted_text,
                uploaded_at,
            ],
        );

        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!("Stored receipt {}", id);
                Ok(id)
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::DuplicateFilename(receipt.filename)),
            Err(e) => Err(e.into()),
        }
    }

    fn list_all(&self) -> Result<Vec<Receipt>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], StoredRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(StoredRow::into_receipt).collect()
    }

    fn get(&self, id: ReceiptId) -> Result<Receipt> {
        self.fetch(id)
    }

    fn update_fields(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt> {
        let mut receipt = self.fetch(id)?;
        update.validate()?;
        if update.is_empty() {
            return Ok(receipt);
        }

        update.apply(&mut receipt);
        self.conn.execute(
            "UPDATE receipts SET vendor = ?1, transaction_date = ?2, amount = ?3, category = ?4 WHERE id = ?5",
            params![
                receipt.vendor,
                receipt.transaction_date,
                receipt.amount.to_string(),
                receipt.category.label(),
                id,
            ],
        )?;
        debug!("Updated receipt {}", id);
        Ok(receipt)
    }

    fn delete(&mut self, id: ReceiptId) -> Result<Receipt> {
        let receipt = self.fetch(id)?;
        self.conn
            .execute("DELETE FROM receipts WHERE id = ?1", params![id])?;
        debug!("Deleted receipt {}", id);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        contract::round_trip(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_list_in_id_order() {
        contract::list_in_id_order(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_rejects_invalid() {
        contract::rejects_invalid(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_rejects_duplicate_filename() {
        contract::rejects_duplicate_filename(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_updates_fields() {
        contract::updates_fields(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_not_found() {
        contract::not_found(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_deletes() {
        contract::deletes(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.sqlite");

        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert(contract::candidate("a.txt")).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let receipts = store.list_all().unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].id, id);
        assert_eq!(receipts[0].amount.to_string(), "45.99");
    }

    #[test]
    fn test_corrupt_amount_is_reported() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert(contract::candidate("a.txt")).unwrap();
        store
            .conn
            .execute("UPDATE receipts SET amount = 'lots' WHERE id = ?1", params![id])
            .unwrap();

        assert!(matches!(
            store.get(id),
            Err(StorageError::Corrupt { id: bad, .. }) if bad == id
        ));
    }
}
