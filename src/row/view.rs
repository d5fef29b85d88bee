use super::read_op::RowReadable;
use crate::error::RecordError;
use crate::serialization::from_bytes;
use crate::types::FieldIter;

// ─── Reader (zero-copy) ────────────────────────────────────────────────────
/// Zero-copy reader over a stored row.
/// No decoding happens until a specific field is requested.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub data_buf: &'a [u8],
    pub field_count: usize,
}

impl<'a> RowView<'a> {
    /// Wrap bytes read back from the store, validating the layout first.
    pub fn parse(data_buf: &'a [u8]) -> Result<Self, RecordError> {
        let (data_buf, field_count) = from_bytes(data_buf)?;
        Ok(Self {
            data_buf,
            field_count,
        })
    }
}

impl<'a> RowReadable for RowView<'a> {
    #[inline]
    fn data_buf(&self) -> &[u8] {
        self.data_buf
    }

    #[inline]
    fn field_count(&self) -> usize {
        self.field_count
    }

    #[inline]
    fn iter_fields(&self) -> FieldIter<'_> {
        FieldIter {
            row: *self,
            pos: 0,
        }
    }
}
