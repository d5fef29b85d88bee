use crate::inventory::record::{ContactRecord, RecordDraft};
use crate::inventory::store::{InventoryStore, MarkOutcome, StoreError};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// In-process inventory. The conditional write runs under the same mutex as
/// reads, so it is a true compare-and-set within one process.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    inner: Mutex<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    records: BTreeMap<u64, ContactRecord>,
    next_position: u64,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from drafts, assigning positions 0, 1, 2, … in order.
    pub fn from_drafts(drafts: impl IntoIterator<Item = RecordDraft>) -> Self {
        let inv = Self::new();
        for draft in drafts {
            inv.append(draft);
        }
        inv
    }

    /// Build from records that already carry positions.
    pub fn from_records(records: impl IntoIterator<Item = ContactRecord>) -> Self {
        let records: BTreeMap<u64, ContactRecord> =
            records.into_iter().map(|r| (r.position, r)).collect();
        let next_position = records.keys().next_back().map_or(0, |p| p + 1);
        Self {
            inner: Mutex::new(Slots {
                records,
                next_position,
            }),
        }
    }

    pub fn append(&self, draft: RecordDraft) -> u64 {
        let mut slots = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let position = slots.next_position;
        slots.next_position += 1;
        slots.records.insert(position, draft.into_record(position));
        position
    }

    pub fn get(&self, position: u64) -> Option<ContactRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|slots| slots.records.get(&position).cloned())
    }

    fn slots(&self) -> Result<MutexGuard<'_, Slots>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("inventory lock poisoned".into()))
    }
}

impl InventoryStore for MemoryInventory {
    fn read_all(&self) -> Result<Vec<ContactRecord>, StoreError> {
        Ok(self.slots()?.records.values().cloned().collect())
    }

    fn conditional_mark_issued(
        &self,
        position: u64,
        issued_at: NaiveDate,
    ) -> Result<MarkOutcome, StoreError> {
        let mut slots = self.slots()?;
        let Some(record) = slots.records.get_mut(&position) else {
            return Ok(MarkOutcome::Missing);
        };
        if record.issued {
            return Ok(MarkOutcome::AlreadyIssued);
        }
        record.issued = true;
        record.issued_at = Some(issued_at);
        Ok(MarkOutcome::Claimed(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn positions_are_sequential() {
        let inv = MemoryInventory::from_drafts([
            RecordDraft::new("Cafes"),
            RecordDraft::new("Bakeries"),
        ]);
        assert_eq!(inv.append(RecordDraft::new("Cafes")), 2);
        let positions: Vec<u64> = inv.read_all().unwrap().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn from_records_continues_after_highest_position() {
        let inv = MemoryInventory::from_records([
            RecordDraft::new("Cafes").into_record(5),
            RecordDraft::new("Cafes").into_record(9),
        ]);
        assert_eq!(inv.append(RecordDraft::new("Cafes")), 10);
    }

    #[test]
    fn mark_issued_is_compare_and_set() {
        let inv = MemoryInventory::from_drafts([RecordDraft::new("Cafes")]);

        let first = inv.conditional_mark_issued(0, day()).unwrap();
        let MarkOutcome::Claimed(record) = first else {
            panic!("expected claim, got {first:?}");
        };
        assert!(record.issued);
        assert_eq!(record.issued_at, Some(day()));

        assert_eq!(
            inv.conditional_mark_issued(0, day()).unwrap(),
            MarkOutcome::AlreadyIssued
        );
        assert_eq!(
            inv.conditional_mark_issued(7, day()).unwrap(),
            MarkOutcome::Missing
        );
    }
}
