// ─── Error ──────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid buffer structure")]
    InvalidBuffer,
    #[error("row exceeds the 32-field limit")]
    TooManyFields,
    #[error("Field not found")]
    FieldNotFound,
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: u8, actual: u8 },
    #[error("Field already exists")]
    FieldExists,
    #[error("nested values are not supported: {0}")]
    NestedValue(String),
    #[error("Unknown type tag: {0}")]
    UnknownTypeTag(u8),
}

/// Failures surfaced by an allocation request. Everything else (no matching
/// category, nothing left to hand out, partial commits) is a normal outcome.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inventory store unavailable")]
    StoreUnavailable(#[source] crate::inventory::StoreError),
}
