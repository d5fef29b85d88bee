use crate::error::RecordError;
use crate::inventory::record::ContactRecord;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),
    #[error("row codec error: {0}")]
    Codec(String),
    #[error("corrupt record at position {position}: {reason}")]
    Corrupt { position: u64, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<RecordError> for StoreError {
    fn from(e: RecordError) -> Self {
        StoreError::Codec(e.to_string())
    }
}

/// Result of a conditional issuance write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The record was unissued at write time and is now issued. Carries the
    /// record as written.
    Claimed(ContactRecord),
    /// Someone else issued it between our snapshot and the write.
    AlreadyIssued,
    /// No record at that position.
    Missing,
}

/// Backing store for the inventory.
///
/// `conditional_mark_issued` is the only write the allocation engine
/// performs; it must succeed only if the stored `issued` flag is still false
/// at write time.
pub trait InventoryStore: Send + Sync {
    /// Full snapshot, ordered by position ascending.
    fn read_all(&self) -> Result<Vec<ContactRecord>, StoreError>;

    /// Compare-and-set `issued: false → true` and stamp `issued_at`.
    fn conditional_mark_issued(
        &self,
        position: u64,
        issued_at: NaiveDate,
    ) -> Result<MarkOutcome, StoreError>;

    /// Whether `conditional_mark_issued` re-checks `issued` atomically. When
    /// false the engine serializes whole allocations instead.
    fn supports_conditional_write(&self) -> bool {
        true
    }
}

impl<S: InventoryStore + ?Sized> InventoryStore for Arc<S> {
    fn read_all(&self) -> Result<Vec<ContactRecord>, StoreError> {
        (**self).read_all()
    }

    fn conditional_mark_issued(
        &self,
        position: u64,
        issued_at: NaiveDate,
    ) -> Result<MarkOutcome, StoreError> {
        (**self).conditional_mark_issued(position, issued_at)
    }

    fn supports_conditional_write(&self) -> bool {
        (**self).supports_conditional_write()
    }
}
