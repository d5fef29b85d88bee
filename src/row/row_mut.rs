use super::RowView;
use super::read_op::RowReadable;
use crate::error::RecordError;
use crate::serialization::from_bytes;
use crate::types::*;

/// Owned, mutable row. Issuance is written through this before the bytes go
/// back into the store.
pub struct RowMut {
    pub data_buf: Vec<u8>,
    pub field_count: usize,
    /// Bumped on every layout-changing mutation.
    pub generation: usize,
}

impl RowMut {
    /// Take ownership of stored bytes, validating the layout first.
    pub fn from_vec(data_buf: Vec<u8>) -> Result<Self, RecordError> {
        let (_, field_count) = from_bytes(&data_buf)?;
        Ok(Self {
            data_buf,
            field_count,
            generation: 0,
        })
    }

    #[inline]
    pub fn as_view(&self) -> RowView<'_> {
        RowView {
            data_buf: &self.data_buf,
            field_count: self.field_count,
        }
    }

    /// Consume and return the underlying buffer. Use this to write to redb.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data_buf
    }

    /// Find the sorted insertion position for a new hash.
    pub fn find_insert_pos(&self, hash: u64) -> usize {
        let mut lo = 0usize;
        let mut hi = self.field_count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.read_hash(mid).is_some_and(|h| h < hash) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl RowReadable for RowMut {
    #[inline]
    fn data_buf(&self) -> &[u8] {
        &self.data_buf
    }

    #[inline]
    fn field_count(&self) -> usize {
        self.field_count
    }

    #[inline]
    fn iter_fields(&self) -> FieldIter<'_> {
        FieldIter {
            row: self.as_view(),
            pos: 0,
        }
    }
}
