use super::types::InventoryDbConfig;
use crate::field_value::FieldValue;
use crate::inventory::record::{DATE_FORMAT, ISSUED, ISSUED_AT};
use crate::inventory::{ContactRecord, InventoryStore, MarkOutcome, RecordDraft, StoreError};
use crate::row::{RowMut, RowReadable, RowView};
use crate::serialization::serialize_into;
use chrono::NaiveDate;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use std::path::Path;
use tracing::debug;

// Key: record position
// Value: serialized row
const RECORDS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("records");
// Key: counter name
// Value: counter value
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");
const NEXT_POSITION: &str = "next_position";

/// redb-backed inventory.
///
/// redb runs one write transaction at a time and holds a file lock against
/// other processes, so reading `issued` and rewriting the row inside a single
/// write transaction is a compare-and-set.
pub struct InventoryDb {
    db: Database,
}

impl InventoryDb {
    /// Open or create the database at the specified path.
    /// Also ensures that the required tables exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::new_with_config(path, InventoryDbConfig::default())
    }

    pub fn new_with_config(
        path: impl AsRef<Path>,
        config: InventoryDbConfig,
    ) -> Result<Self, StoreError> {
        let db = Database::builder()
            .set_cache_size(config.cache_size_bytes)
            .create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RECORDS_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Append one record; returns its position.
    pub fn append(&self, draft: &RecordDraft) -> Result<u64, StoreError> {
        let positions = self.bulk_load(std::slice::from_ref(draft))?;
        positions
            .first()
            .copied()
            .ok_or_else(|| StoreError::Unavailable("append assigned no position".into()))
    }

    /// Append records in order within a single write transaction.
    ///
    /// Rows are serialized BEFORE `begin_write()` to keep the write lock short.
    /// Positions continue from the stored counter and are never reused.
    pub fn bulk_load(&self, drafts: &[RecordDraft]) -> Result<Vec<u64>, StoreError> {
        let mut rows = Vec::with_capacity(drafts.len());
        let mut buf = Vec::new();
        for draft in drafts {
            serialize_into(&draft.to_row_map(), &mut buf)?;
            rows.push(buf.clone());
        }

        let write_txn = self.db.begin_write()?;
        let positions = {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let mut table = write_txn.open_table(RECORDS_TABLE)?;
            let start = meta.get(NEXT_POSITION)?.map_or(0, |g| g.value());

            let mut positions = Vec::with_capacity(rows.len());
            for (offset, row) in rows.iter().enumerate() {
                let position = start + offset as u64;
                table.insert(position, row.as_slice())?;
                positions.push(position);
            }
            meta.insert(NEXT_POSITION, start + rows.len() as u64)?;
            positions
        };
        write_txn.commit()?;

        debug!(count = positions.len(), "bulk loaded inventory rows");
        Ok(positions)
    }

    /// Retrieve one record by position.
    pub fn get_record(&self, position: u64) -> Result<Option<ContactRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECORDS_TABLE)?;

        match table.get(position)? {
            Some(access) => {
                let row = RowView::parse(access.value())?;
                Ok(Some(ContactRecord::from_row(position, &row)?))
            }
            None => Ok(None),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECORDS_TABLE)?;
        Ok(table.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl InventoryStore for InventoryDb {
    fn read_all(&self) -> Result<Vec<ContactRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECORDS_TABLE)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let position = key.value();
            let row = RowView::parse(value.value())?;
            records.push(ContactRecord::from_row(position, &row)?);
        }
        Ok(records)
    }

    fn conditional_mark_issued(
        &self,
        position: u64,
        issued_at: NaiveDate,
    ) -> Result<MarkOutcome, StoreError> {
        let stamp = FieldValue::from(issued_at.format(DATE_FORMAT).to_string());

        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(RECORDS_TABLE)?;
            let current = table.get(position)?.map(|access| access.value().to_vec());

            match current {
                None => MarkOutcome::Missing,
                Some(bytes) => {
                    let mut row = RowMut::from_vec(bytes)?;
                    if row.get_bool(ISSUED).unwrap_or(false) {
                        MarkOutcome::AlreadyIssued
                    } else {
                        row.put_field(ISSUED, &FieldValue::Bool(true))?;
                        row.put_field(ISSUED_AT, &stamp)?;
                        let record = ContactRecord::from_row(position, &row)?;
                        table.insert(position, row.data_buf.as_slice())?;
                        MarkOutcome::Claimed(record)
                    }
                }
            }
        };

        match outcome {
            MarkOutcome::Claimed(_) => write_txn.commit()?,
            _ => write_txn.abort()?,
        }
        Ok(outcome)
    }
}
