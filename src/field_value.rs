use crate::error::RecordError;
use smol_str::SmolStr;

// ─── FieldValue ─────────────────────────────────────────────────────────────

/// A single flat cell value. Inventory rows never nest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    Str(SmolStr),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I64(i) => Some(*i),
            FieldValue::U64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Render the value the way a spreadsheet cell would show it.
    /// Null renders as `None`.
    pub fn to_text(&self) -> Option<SmolStr> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(SmolStr::new(if *b { "TRUE" } else { "FALSE" })),
            FieldValue::I64(i) => Some(SmolStr::new(i.to_string())),
            FieldValue::U64(u) => Some(SmolStr::new(u.to_string())),
            FieldValue::Str(s) => Some(s.clone()),
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::I64(n)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::U64(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(SmolStr::from(s))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(SmolStr::from(s))
    }
}

impl From<SmolStr> for FieldValue {
    fn from(s: SmolStr) -> Self {
        FieldValue::Str(s)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

// ─── From serde_json::Value ─────────────────────────────────────────────────

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = RecordError;

    fn try_from(v: &serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match v {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::I64(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::U64(u)
                } else {
                    from_float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => FieldValue::Str(SmolStr::from(s.as_str())),
            serde_json::Value::Array(_) => return Err(RecordError::NestedValue("array".into())),
            serde_json::Value::Object(_) => return Err(RecordError::NestedValue("object".into())),
        })
    }
}

// ─── From cbor4ii::core::Value ──────────────────────────────────────────────

impl TryFrom<&cbor4ii::core::Value> for FieldValue {
    type Error = RecordError;

    fn try_from(v: &cbor4ii::core::Value) -> Result<Self, Self::Error> {
        use cbor4ii::core::Value;
        Ok(match v {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Integer(i) => {
                if let Ok(val) = i64::try_from(*i) {
                    FieldValue::I64(val)
                } else if let Ok(val) = u64::try_from(*i) {
                    FieldValue::U64(val)
                } else {
                    FieldValue::Str(SmolStr::new(i.to_string()))
                }
            }
            Value::Float(f) => from_float(*f),
            Value::Text(s) => FieldValue::Str(SmolStr::from(s.as_str())),
            Value::Tag(_, inner) => FieldValue::try_from(inner.as_ref())?,
            Value::Array(_) => return Err(RecordError::NestedValue("array".into())),
            Value::Map(_) => return Err(RecordError::NestedValue("map".into())),
            other => return Err(RecordError::NestedValue(format!("{other:?}"))),
        })
    }
}

/// Spreadsheets hand out phone numbers as floats; keep whole numbers integral.
fn from_float(f: f64) -> FieldValue {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        FieldValue::I64(f as i64)
    } else {
        FieldValue::Str(SmolStr::new(f.to_string()))
    }
}
