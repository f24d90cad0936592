//! Durable receipt records keyed by identifier.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StorageError;
use crate::models::receipt::{NewReceipt, Receipt, ReceiptId, ReceiptUpdate};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A receipt record store.
///
/// Implementations validate candidates before writing and keep filenames
/// unique; `uploaded_at` is assigned by the store.
pub trait ReceiptStore {
    /// Store a new receipt, returning its identifier.
    fn insert(&mut self, receipt: NewReceipt) -> Result<ReceiptId>;

    /// Every stored receipt, ordered by identifier.
    fn list_all(&self) -> Result<Vec<Receipt>>;

    fn get(&self, id: ReceiptId) -> Result<Receipt>;

    /// Apply a partial edit and return the updated record.
    fn update_fields(&mut self, id: ReceiptId, update: &ReceiptUpdate) -> Result<Receipt>;

    /// Remove a receipt, returning what was removed.
    fn delete(&mut self, id: ReceiptId) -> Result<Receipt>;
}
