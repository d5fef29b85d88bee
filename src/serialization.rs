use super::error::RecordError;
use super::field_value::FieldValue;
use super::types::*;
use arrayvec::ArrayVec;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use xxhash_rust::const_xxh64::xxh64;

/// Hash a field name the way the row index stores it.
#[inline]
pub const fn field_hash(name: &str) -> u64 {
    xxh64(name.as_bytes(), 0)
}

// ─── Writer ─────────────────────────────────────────────────────────────────

/// Serialize a single field value into `buf`, returning its type tag.
#[inline]
pub fn write_field_into(buf: &mut Vec<u8>, value: &FieldValue) -> u8 {
    match value {
        FieldValue::Null => TAG_NULL,
        FieldValue::Bool(b) => {
            buf.push(*b as u8);
            TAG_BOOL
        }
        FieldValue::I64(i) => {
            buf.extend_from_slice(&i.to_le_bytes());
            TAG_I64
        }
        FieldValue::U64(u) => {
            buf.extend_from_slice(&u.to_le_bytes());
            TAG_U64
        }
        FieldValue::Str(s) => {
            buf.extend_from_slice(s.as_bytes());
            TAG_STR
        }
    }
}

/// Fill the index and data area of a buffer whose header/index region is
/// already zero-sized to `HEADER_SIZE + n * INDEX_ENTRY_SIZE`.
///
/// **IMPORTANT**: The index is sorted by name_hash. Readers binary-search it.
pub fn prepare_buf(
    map: &BTreeMap<SmolStr, FieldValue>,
    buf: &mut Vec<u8>,
    field_count: usize,
) -> Result<(), RecordError> {
    // Stack-allocated sort buffer, no heap allocation for ≤32 fields
    let mut entries: ArrayVec<(&FieldValue, u64), MAX_FIELDS> = ArrayVec::new();

    for (key, value) in map.iter() {
        entries
            .try_push((value, field_hash(key)))
            .map_err(|_| RecordError::TooManyFields)?;
    }

    entries.sort_unstable_by_key(|(_, hash)| *hash);

    buf[0..4].copy_from_slice(&(field_count as u32).to_le_bytes());

    for (i, (value, hash)) in entries.iter().enumerate() {
        let data_offset = buf.len();
        let tag = write_field_into(buf, value);
        let data_length = buf.len() - data_offset;

        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        let entry = &mut buf[idx..idx + INDEX_ENTRY_SIZE];
        entry[0..8].copy_from_slice(&hash.to_le_bytes());
        entry[8..12].copy_from_slice(&(data_offset as u32).to_le_bytes());
        entry[12..16].copy_from_slice(&(data_length as u32).to_le_bytes());
        entry[16] = tag;
    }
    Ok(())
}

/// Serialize a field map into a fresh row buffer. Returns `(bytes, field_count)`.
pub fn serialize(map: &BTreeMap<SmolStr, FieldValue>) -> Result<(Vec<u8>, usize), RecordError> {
    let mut buf = Vec::new();
    let field_count = serialize_into(map, &mut buf)?;
    Ok((buf, field_count))
}

/// Identical to [`serialize`], but reuses the caller's Vec so bulk loads
/// don't allocate per row. The buffer is cleared but retains its capacity.
pub fn serialize_into(
    map: &BTreeMap<SmolStr, FieldValue>,
    buf: &mut Vec<u8>,
) -> Result<usize, RecordError> {
    let field_count = map.len();
    if field_count > MAX_FIELDS {
        return Err(RecordError::TooManyFields);
    }
    let data_start = HEADER_SIZE + field_count * INDEX_ENTRY_SIZE;

    buf.clear();
    buf.reserve(data_start + field_count * 16);
    // resize zero-fills the header/index area so entries can be written by index
    buf.resize(data_start, 0);

    prepare_buf(map, buf, field_count)?;
    Ok(field_count)
}

/// Validate a stored row and extract its field count.
///
/// Every index entry must point inside the buffer and carry a known tag, so
/// readers can slice without further bounds surprises.
pub fn from_bytes(buf: &[u8]) -> Result<(&[u8], usize), RecordError> {
    if buf.len() < HEADER_SIZE {
        return Err(RecordError::InvalidBuffer);
    }
    let field_count = u32::from_le_bytes(
        buf[0..4]
            .try_into()
            .map_err(|_| RecordError::InvalidBuffer)?,
    ) as usize;
    if field_count > MAX_FIELDS {
        return Err(RecordError::TooManyFields);
    }
    let data_start = HEADER_SIZE + field_count * INDEX_ENTRY_SIZE;
    if buf.len() < data_start {
        return Err(RecordError::InvalidBuffer);
    }
    for i in 0..field_count {
        let idx = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
        let entry = &buf[idx..idx + INDEX_ENTRY_SIZE];
        let offset = u32::from_le_bytes(
            entry[8..12]
                .try_into()
                .map_err(|_| RecordError::InvalidBuffer)?,
        ) as usize;
        let len = u32::from_le_bytes(
            entry[12..16]
                .try_into()
                .map_err(|_| RecordError::InvalidBuffer)?,
        ) as usize;
        let tag = entry[16];
        if tag > TAG_STR {
            return Err(RecordError::UnknownTypeTag(tag));
        }
        if offset < data_start || offset + len > buf.len() {
            return Err(RecordError::InvalidBuffer);
        }
    }
    Ok((buf, field_count))
}
