//! In-process receipt store.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use super::{ReceiptStore, Result};
use crate::error::StorageError;
use crate::models::receipt::{NewReceipt, Receipt, ReceiptId, ReceiptUpdate};

/// A store that keeps receipts in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    receipts: BTreeMap<ReceiptId, Receipt>,
    last_id: ReceiptId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl ReceiptStore for MemoryStore {
    fn insert(&mut self, receipt: NewReceipt) -> Result<ReceiptId> {
        receipt.validate()?;
        if self.receipts.values().any(|r| r.filename == receipt.filename) {
            return Err(StorageError::DuplicateFilename(receipt.filename));
        }

        self.last_id += 1;
        let id = self.last_id;
        self.receipts.insert(id, Receipt::from_new(id, receipt, Self::now()));
        debug!("Stored receipt {}", id);
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<Receipt>> {
        Ok(self.receipts.values().cloned().collect())
    }

    fn get(&self, id: ReceiptId) -> Result<Receipt> {
        self.receipts
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    fn update_fields(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt> {
        let receipt = self.receipts.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        update.validate()?;
        update.apply(receipt);
        Ok(receipt.clone())
    }

    fn delete(&mut self, id: ReceiptId) -> Result<Receipt> {
        self.receipts.remove(&id).ok_or(StorageError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_round_trip() {
        contract::round_trip(&mut MemoryStore::new());
    }

    #[test]
    fn test_list_in_id_order() {
        contract::list_in_id_order(&mut MemoryStore::new());
    }

    #[test]
    fn test_rejects_invalid() {
        contract::rejects_invalid(&mut MemoryStore::new());
    }

    #[test]
    fn test_rejects_duplicate_filename() {
        contract::rejects_duplicate_filename(&mut MemoryStore::new());
    }

    #[test]
    fn test_updates_fields() {
        contract::updates_fields(&mut MemoryStore::new());
    }

    #[test]
    fn test_not_found() {
        contract::not_found(&mut MemoryStore::new());
    }

    #[test]
    fn test_deletes() {
        contract::deletes(&mut MemoryStore::new());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = MemoryStore::new();
        let a = store.insert(contract::candidate("a.txt")).unwrap();
        store.delete(a).unwrap();
        let b = store.insert(contract::candidate("b.txt")).unwrap();
        assert!(b > a);
        assert_eq!(store.len(), 1);
    }
}
