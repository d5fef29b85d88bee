use crate::db::InventoryDb;
use crate::error::RecordError;
use crate::field_value::FieldValue;
use crate::inventory::record::{CATEGORY, DATE_FORMAT, ISSUED, ISSUED_AT};
use crate::inventory::{ContactField, RecordDraft, StoreError};
use chrono::NaiveDate;
use smol_str::SmolStr;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cbor error: {0}")]
    Cbor(String),
    #[error("row {row}: {reason}")]
    Shape { row: usize, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportFormat {
    Json,
    Cbor,
}

impl ImportFormat {
    /// `.cbor` files are CBOR; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("cbor") => ImportFormat::Cbor,
            _ => ImportFormat::Json,
        }
    }
}

/// Where an input column lands on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Category,
    Contact(ContactField),
    Issued,
    IssuedAt,
}

/// Spreadsheet headers accepted next to the canonical column names.
const HEADER_ALIASES: &[(&str, Column)] = &[
    ("Рубрика", Column::Category),
    ("Название компании", Column::Contact(ContactField::Name)),
    ("Стационарный телефон компании", Column::Contact(ContactField::Landline)),
    ("Мобильный телефон компании", Column::Contact(ContactField::Mobile)),
    ("Бесплатный номер компании", Column::Contact(ContactField::TollFree)),
    ("Whatsapp компании", Column::Contact(ContactField::Whatsapp)),
    ("Telegram компании", Column::Contact(ContactField::Telegram)),
    ("Viber компании", Column::Contact(ContactField::Viber)),
    ("Email компании", Column::Contact(ContactField::Email)),
    ("Сайт", Column::Contact(ContactField::Website)),
    ("Социальные сети", Column::Contact(ContactField::Socials)),
    ("Заголовок сайта (title)", Column::Contact(ContactField::Title)),
    ("was_issued", Column::Issued),
    ("issue_date", Column::IssuedAt),
];

fn resolve_column(key: &str) -> Option<Column> {
    let key = key.trim();
    match key {
        CATEGORY => return Some(Column::Category),
        ISSUED => return Some(Column::Issued),
        ISSUED_AT => return Some(Column::IssuedAt),
        _ => {}
    }
    if let Some(field) = ContactField::ALL.into_iter().find(|f| f.column() == key) {
        return Some(Column::Contact(field));
    }
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, col)| *col)
}

type RawRow = Vec<(String, FieldValue)>;

fn shape(row: usize, reason: impl Into<String>) -> ImportError {
    ImportError::Shape {
        row,
        reason: reason.into(),
    }
}

fn cell(row: usize, key: &str, value: Result<FieldValue, RecordError>) -> Result<FieldValue, ImportError> {
    value.map_err(|e| shape(row, format!("column {key:?}: {e}")))
}

fn rows_from_json(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(items) = value else {
        return Err(shape(0, "top level must be an array of objects"));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let serde_json::Value::Object(obj) = item else {
            return Err(shape(idx, "expected an object"));
        };
        let mut row = RawRow::with_capacity(obj.len());
        for (key, v) in obj {
            row.push((key.clone(), cell(idx, key, FieldValue::try_from(v))?));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn rows_from_cbor(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    use cbor4ii::core::Value;

    let value: Value =
        cbor4ii::serde::from_slice(bytes).map_err(|e| ImportError::Cbor(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(shape(0, "top level must be an array of maps"));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Value::Map(entries) = item else {
            return Err(shape(idx, "expected a map"));
        };
        let mut row = RawRow::with_capacity(entries.len());
        for (k, v) in entries {
            let Value::Text(key) = k else {
                return Err(shape(idx, "map keys must be text"));
            };
            row.push((key.clone(), cell(idx, key, FieldValue::try_from(v))?));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn text(value: &FieldValue) -> Option<SmolStr> {
    value
        .to_text()
        .map(|t| SmolStr::new(t.trim()))
        .filter(|t| !t.is_empty())
}

fn draft_from_row(idx: usize, row: RawRow, today: NaiveDate) -> Result<RecordDraft, ImportError> {
    let mut draft = RecordDraft::default();
    let mut issued = false;
    let mut issued_at = None;

    for (key, value) in row {
        match resolve_column(&key) {
            Some(Column::Category) => draft.category = text(&value).unwrap_or_default(),
            Some(Column::Contact(field)) => draft.contact.set(field, text(&value)),
            Some(Column::Issued) => {
                issued = text(&value).is_some_and(|t| t.eq_ignore_ascii_case("true"));
            }
            Some(Column::IssuedAt) => {
                issued_at = match text(&value) {
                    Some(raw) => Some(
                        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                            .map_err(|e| shape(idx, format!("bad issue date {raw:?}: {e}")))?,
                    ),
                    None => None,
                };
            }
            None => {}
        }
    }

    // A date without the flag is dropped; a flag without a date gets today.
    draft.issued_at = issued.then(|| issued_at.unwrap_or(today));
    Ok(draft)
}

/// Parse an import file into drafts, in file order.
pub fn parse_drafts(
    bytes: &[u8],
    format: ImportFormat,
    today: NaiveDate,
) -> Result<Vec<RecordDraft>, ImportError> {
    let rows = match format {
        ImportFormat::Json => rows_from_json(bytes)?,
        ImportFormat::Cbor => rows_from_cbor(bytes)?,
    };
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| draft_from_row(idx, row, today))
        .collect()
}

/// Load a file into the store as one write transaction. Returns the
/// assigned positions.
pub fn import_file(
    db: &InventoryDb,
    path: &Path,
    format: ImportFormat,
    today: NaiveDate,
) -> Result<Vec<u64>, ImportError> {
    let bytes = std::fs::read(path)?;
    let drafts = parse_drafts(&bytes, format, today)?;
    let positions = db.bulk_load(&drafts)?;
    info!(path = %path.display(), rows = positions.len(), "import complete");
    Ok(positions)
}
