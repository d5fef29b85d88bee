use crate::deserialization::decode_field;
use crate::error::RecordError;
use crate::field_value::FieldValue;
use crate::types::*;
use xxhash_rust::xxh64::xxh64;

/// Shared read access for [`RowView`](super::RowView) and [`RowMut`](super::RowMut).
///
/// All slicing goes through `get`, so a row that slipped past validation
/// yields `None` instead of panicking.
pub trait RowReadable {
    fn data_buf(&self) -> &[u8];
    fn field_count(&self) -> usize;
    /// Iterate over all raw fields (zero-copy)
    fn iter_fields(&self) -> FieldIter<'_>;

    #[inline]
    fn read_index(&self, i: usize) -> Option<IndexEntry> {
        if i >= self.field_count() {
            return None;
        }
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        let entry = self.data_buf().get(idx..idx + INDEX_ENTRY_SIZE)?;
        Some(IndexEntry {
            name_hash: u64::from_le_bytes(entry[0..8].try_into().ok()?),
            data_offset: u32::from_le_bytes(entry[8..12].try_into().ok()?) as usize,
            data_len: u32::from_le_bytes(entry[12..16].try_into().ok()?) as usize,
            type_tag: entry[16],
        })
    }

    #[inline]
    fn read_hash(&self, i: usize) -> Option<u64> {
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        let bytes = self.data_buf().get(idx..idx + 8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    #[inline]
    fn linear_hash_search(&self, n: usize, hash: u64) -> Result<(usize, IndexEntry), RecordError> {
        for i in 0..n {
            if self.read_hash(i) == Some(hash) {
                return self
                    .read_index(i)
                    .map(|meta| (i, meta))
                    .ok_or(RecordError::InvalidBuffer);
            }
        }
        Err(RecordError::FieldNotFound)
    }

    fn binary_hash_search(&self, n: usize, hash: u64) -> Result<(usize, IndexEntry), RecordError> {
        let mut lo = 0usize;
        let mut hi = n;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mid_hash = self.read_hash(mid).ok_or(RecordError::InvalidBuffer)?;
            match mid_hash.cmp(&hash) {
                std::cmp::Ordering::Equal => {
                    let meta = self.read_index(mid).ok_or(RecordError::InvalidBuffer)?;
                    return Ok((mid, meta));
                }
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Err(RecordError::FieldNotFound)
    }

    /// Find a field by name. Returns (index_position, IndexEntry).
    fn find_field(&self, name: &str) -> Result<(usize, IndexEntry), RecordError> {
        let hash = xxh64(name.as_bytes(), 0);
        let n = self.field_count();

        if n == 0 {
            return Err(RecordError::FieldNotFound);
        }
        if n <= 4 {
            return self.linear_hash_search(n, hash);
        }
        self.binary_hash_search(n, hash)
    }

    #[inline]
    fn field_bytes(&self, meta: &IndexEntry) -> Option<&[u8]> {
        self.data_buf()
            .get(meta.data_offset..meta.data_offset + meta.data_len)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Typed getters
    // ════════════════════════════════════════════════════════════════════════

    /// Get a string field (zero-copy).
    #[inline]
    fn get_str(&self, name: &str) -> Option<&str> {
        let (_, meta) = self.find_field(name).ok()?;
        if meta.type_tag != TAG_STR {
            return None;
        }
        std::str::from_utf8(self.field_bytes(&meta)?).ok()
    }

    #[inline]
    fn get_i64(&self, name: &str) -> Option<i64> {
        let (_, meta) = self.find_field(name).ok()?;
        if meta.type_tag != TAG_I64 {
            return None;
        }
        Some(i64::from_le_bytes(self.field_bytes(&meta)?.try_into().ok()?))
    }

    #[inline]
    fn get_u64(&self, name: &str) -> Option<u64> {
        let (_, meta) = self.find_field(name).ok()?;
        if meta.type_tag != TAG_U64 {
            return None;
        }
        Some(u64::from_le_bytes(self.field_bytes(&meta)?.try_into().ok()?))
    }

    #[inline]
    fn get_bool(&self, name: &str) -> Option<bool> {
        let (_, meta) = self.find_field(name).ok()?;
        if meta.type_tag != TAG_BOOL || meta.data_len != 1 {
            return None;
        }
        Some(*self.field_bytes(&meta)?.first()? != 0)
    }

    /// Get raw field reference (zero-copy).
    fn get_raw(&self, name: &str) -> Option<FieldRef<'_>> {
        let (_, meta) = self.find_field(name).ok()?;
        let data = self.field_bytes(&meta)?;
        Some(FieldRef {
            name_hash: meta.name_hash,
            type_tag: meta.type_tag,
            data,
        })
    }

    /// Get any field as an owned [`FieldValue`].
    fn get_field(&self, name: &str) -> Option<FieldValue> {
        decode_field(self.get_raw(name)?)
    }

    #[inline]
    fn has_field(&self, name: &str) -> bool {
        self.find_field(name).is_ok()
    }

    #[inline]
    fn field_type(&self, name: &str) -> Option<u8> {
        self.find_field(name).ok().map(|(_, m)| m.type_tag)
    }
}
