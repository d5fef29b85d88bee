use crate::row::RowView;
use crate::row::RowReadable;
use rustc_hash::FxHasher;
use std::collections::HashSet;
use std::hash::BuildHasherDefault;

pub type FastHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;

// ─── Type Tags ──────────────────────────────────────────────────────────────
pub const TAG_NULL: u8 = 0;
pub const TAG_BOOL: u8 = 1;
pub const TAG_I64: u8 = 2;
pub const TAG_U64: u8 = 3;
pub const TAG_STR: u8 = 4;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Header (20 bytes)                            │
//  │   field_count: u32 (LE)                      │
//  │   _reserved: [u8; 16]                        │
//  ├──────────────────────────────────────────────┤
//  │ Index (20 bytes × field_count)               │
//  │   name_hash:   u64 (LE)    ← SORTED by hash  │
//  │   data_offset: u32 (LE)                      │
//  │   data_length: u32 (LE)                      │
//  │   type_tag:    u8                            │
//  │   _padding:    [u8; 3]                       │
//  ├──────────────────────────────────────────────┤
//  │ Data (variable)                              │
//  │   field values packed sequentially           │
//  └──────────────────────────────────────────────┘

pub const HEADER_SIZE: usize = 20; // 4 + 16
pub const INDEX_ENTRY_SIZE: usize = 20; // 8 + 4 + 4 + 1 + 3
pub const MAX_FIELDS: usize = 32;

/// A parsed index entry from the binary header. Internal only.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    pub name_hash: u64,
    pub data_offset: usize,
    pub data_len: usize,
    pub type_tag: u8,
}

/// A raw, zero-copy reference to a field's bytes. No decoding.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub name_hash: u64,
    pub type_tag: u8,
    pub data: &'a [u8],
}

// ─── Iterator ───────────────────────────────────────────────────────────────

pub struct FieldIter<'a> {
    pub row: RowView<'a>,
    pub pos: usize,
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = FieldRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.row.field_count {
            return None;
        }
        let entry = self.row.read_index(self.pos)?;
        let data = self
            .row
            .data_buf
            .get(entry.data_offset..entry.data_offset + entry.data_len)?;
        self.pos += 1;
        Some(FieldRef {
            name_hash: entry.name_hash,
            type_tag: entry.type_tag,
            data,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row.field_count - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for FieldIter<'a> {}
