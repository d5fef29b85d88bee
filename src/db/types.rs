use crate::inventory::StoreError;

/// Configuration for [`InventoryDb::new_with_config`](super::InventoryDb::new_with_config).
#[derive(Debug, Clone)]
pub struct InventoryDbConfig {
    /// Page cache handed to redb, in bytes.
    ///
    /// Default: 64 MiB. A full snapshot read per allocation touches every
    /// row, so the cache should comfortably hold the whole inventory.
    pub cache_size_bytes: usize,
}

impl Default for InventoryDbConfig {
    fn default() -> Self {
        Self {
            cache_size_bytes: 64 * 1024 * 1024,
        }
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        StoreError::Redb(e.into())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        StoreError::Redb(e.into())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        StoreError::Redb(e.into())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        StoreError::Redb(e.into())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        StoreError::Redb(e.into())
    }
}
