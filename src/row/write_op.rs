use super::read_op::RowReadable;
use super::row_mut::RowMut;
use crate::error::RecordError;
use crate::field_value::FieldValue;
use crate::serialization::{field_hash, write_field_into};
use crate::types::*;

impl RowMut {
    // ════════════════════════════════════════════════════════════════════════
    // Internal: index writes
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    fn write_index_offset(&mut self, i: usize, offset: usize) {
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        self.data_buf[idx + 8..idx + 12].copy_from_slice(&(offset as u32).to_le_bytes());
    }

    #[inline]
    fn write_index_length(&mut self, i: usize, length: usize) {
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        self.data_buf[idx + 12..idx + 16].copy_from_slice(&(length as u32).to_le_bytes());
    }

    #[inline]
    fn write_index_tag(&mut self, i: usize, tag: u8) {
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        self.data_buf[idx + 16] = tag;
    }

    /// After a splice at `splice_offset`, shift data_offsets of every field
    /// whose data starts at or after the old end of the spliced field.
    /// The field at `skip_pos` (the one just modified) is excluded.
    fn fixup_offsets_after_splice(&mut self, skip_pos: usize, old_end: usize, delta: isize) {
        for i in 0..self.field_count {
            if i == skip_pos {
                continue;
            }
            let Some(meta) = self.read_index(i) else {
                continue;
            };
            if meta.data_offset >= old_end {
                let new_offset = (meta.data_offset as isize + delta) as usize;
                self.write_index_offset(i, new_offset);
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal: buffer splice
    // ════════════════════════════════════════════════════════════════════════

    /// Replace `old_len` bytes at `offset` with `new_data`.
    /// Handles grow, shrink, and same-size cases.
    fn splice_data(&mut self, offset: usize, old_len: usize, new_data: &[u8]) {
        let new_len = new_data.len();
        let old_end = offset + old_len;
        let tail_len = self.data_buf.len() - old_end;

        if new_len == old_len {
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
        } else if new_len > old_len {
            let growth = new_len - old_len;
            self.data_buf.resize(self.data_buf.len() + growth, 0);
            // Shift tail right
            self.data_buf
                .copy_within(old_end..old_end + tail_len, old_end + growth);
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
        } else {
            let shrink = old_len - new_len;
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
            // Shift tail left
            self.data_buf
                .copy_within(old_end..old_end + tail_len, old_end - shrink);
            self.data_buf.truncate(self.data_buf.len() - shrink);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Setters
    // ════════════════════════════════════════════════════════════════════════

    /// Set a bool field. In-place overwrite, zero allocation.
    #[inline]
    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), RecordError> {
        let (_, meta) = self.find_field(name)?;
        if meta.type_tag != TAG_BOOL {
            return Err(RecordError::TypeMismatch {
                expected: TAG_BOOL,
                actual: meta.type_tag,
            });
        }
        self.data_buf[meta.data_offset] = value as u8;
        Ok(())
    }

    /// Set any existing field to any value. Same-size writes overwrite in
    /// place; anything else splices and fixes up the following offsets.
    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), RecordError> {
        let (pos, meta) = self.find_field(name)?;
        let mut new_bytes = Vec::new();
        let new_tag = write_field_into(&mut new_bytes, value);

        if new_bytes.len() == meta.data_len {
            if !new_bytes.is_empty() {
                self.data_buf[meta.data_offset..meta.data_offset + meta.data_len]
                    .copy_from_slice(&new_bytes);
            }
            if new_tag != meta.type_tag {
                self.write_index_tag(pos, new_tag);
            }
        } else {
            let delta = new_bytes.len() as isize - meta.data_len as isize;
            self.splice_data(meta.data_offset, meta.data_len, &new_bytes);
            self.write_index_length(pos, new_bytes.len());
            self.write_index_tag(pos, new_tag);
            self.fixup_offsets_after_splice(pos, meta.data_offset + meta.data_len, delta);
            self.generation += 1; // Layout changed
        }
        Ok(())
    }

    pub fn set_null(&mut self, name: &str) -> Result<(), RecordError> {
        self.set_field(name, &FieldValue::Null)
    }

    /// Set the field if present, otherwise add it.
    pub fn put_field(&mut self, name: &str, value: &FieldValue) -> Result<(), RecordError> {
        match self.set_field(name, value) {
            Err(RecordError::FieldNotFound) => self.add_field(name, value),
            other => other,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Structural mutation
    // ════════════════════════════════════════════════════════════════════════

    /// Add a new field, keeping the index sorted.
    ///
    /// Rebuilds the buffer with the new field at its sorted position; rows
    /// written before a column existed get it backfilled this way.
    pub fn add_field(&mut self, name: &str, value: &FieldValue) -> Result<(), RecordError> {
        if self.find_field(name).is_ok() {
            return Err(RecordError::FieldExists);
        }
        if self.field_count >= MAX_FIELDS {
            return Err(RecordError::TooManyFields);
        }

        let hash = field_hash(name);
        let mut new_bytes = Vec::new();
        let new_tag = write_field_into(&mut new_bytes, value);
        let insert_pos = self.find_insert_pos(hash);
        let old_n = self.field_count;
        let new_n = old_n + 1;

        let mut entries: Vec<IndexEntry> = Vec::with_capacity(old_n);
        for i in 0..old_n {
            entries.push(self.read_index(i).ok_or(RecordError::InvalidBuffer)?);
        }

        let new_data_start = HEADER_SIZE + new_n * INDEX_ENTRY_SIZE;
        let existing_data: usize = entries.iter().map(|e| e.data_len).sum();
        let mut new_buf = vec![0u8; new_data_start + existing_data + new_bytes.len()];
        new_buf[0..4].copy_from_slice(&(new_n as u32).to_le_bytes());

        let mut data_offset = new_data_start;
        let mut src = entries.iter();
        for dst_i in 0..new_n {
            let (hash, tag, bytes): (u64, u8, &[u8]) = if dst_i == insert_pos {
                (hash, new_tag, &new_bytes)
            } else {
                let e = src.next().ok_or(RecordError::InvalidBuffer)?;
                let bytes = self
                    .data_buf
                    .get(e.data_offset..e.data_offset + e.data_len)
                    .ok_or(RecordError::InvalidBuffer)?;
                (e.name_hash, e.type_tag, bytes)
            };

            let idx = HEADER_SIZE + dst_i * INDEX_ENTRY_SIZE;
            new_buf[idx..idx + 8].copy_from_slice(&hash.to_le_bytes());
            new_buf[idx + 8..idx + 12].copy_from_slice(&(data_offset as u32).to_le_bytes());
            new_buf[idx + 12..idx + 16].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
            new_buf[idx + 16] = tag;
            new_buf[data_offset..data_offset + bytes.len()].copy_from_slice(bytes);
            data_offset += bytes.len();
        }

        self.data_buf = new_buf;
        self.field_count = new_n;
        self.generation += 1; // Added field, layout changed
        Ok(())
    }
}
