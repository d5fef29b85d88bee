use super::field_value::FieldValue;
use super::types::*;
use smol_str::SmolStr;

// ─── Decode Field ───────────────────────────────────────────────────────────

/// Decode a raw field reference into an owned [`FieldValue`].
#[inline]
pub fn decode_field(field: FieldRef) -> Option<FieldValue> {
    Some(match field.type_tag {
        TAG_NULL => FieldValue::Null,
        TAG_BOOL => FieldValue::Bool(*field.data.first()? != 0),
        TAG_I64 => {
            let bytes: [u8; 8] = field.data.try_into().ok()?;
            FieldValue::I64(i64::from_le_bytes(bytes))
        }
        TAG_U64 => {
            let bytes: [u8; 8] = field.data.try_into().ok()?;
            FieldValue::U64(u64::from_le_bytes(bytes))
        }
        TAG_STR => FieldValue::Str(SmolStr::from(std::str::from_utf8(field.data).ok()?)),
        _ => return None,
    })
}
