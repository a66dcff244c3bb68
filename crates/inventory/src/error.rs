use thiserror::Error;
use wastetrack_core::DomainError;

/// Errors surfaced by the inventory store.
///
/// Read failures never escape `InventoryStore::load` (the unreadable part is
/// skipped instead) but are kept so callers can tell the operator what happened.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to read persisted inventory: {0}")]
    PersistenceRead(String),

    #[error("failed to persist inventory: {0}")]
    PersistenceWrite(String),
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_write_failure(&self) -> bool {
        matches!(self, InventoryError::PersistenceWrite(_))
    }
}
