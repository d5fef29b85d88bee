use crate::field_value::FieldValue;
use crate::inventory::store::StoreError;
use crate::row::RowReadable;
use chrono::NaiveDate;
use serde::Serialize;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Stored column holding the category label.
pub const CATEGORY: &str = "category";
/// Stored column holding the issuance flag.
pub const ISSUED: &str = "issued";
/// Stored column holding the issuance date, `YYYY-MM-DD` or null.
pub const ISSUED_AT: &str = "issued_at";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The contact attributes a record may carry, in public output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Landline,
    Mobile,
    TollFree,
    Whatsapp,
    Telegram,
    Viber,
    Email,
    Website,
    Socials,
    Title,
}

impl ContactField {
    pub const ALL: [ContactField; 11] = [
        ContactField::Name,
        ContactField::Landline,
        ContactField::Mobile,
        ContactField::TollFree,
        ContactField::Whatsapp,
        ContactField::Telegram,
        ContactField::Viber,
        ContactField::Email,
        ContactField::Website,
        ContactField::Socials,
        ContactField::Title,
    ];

    /// Canonical stored column name.
    pub const fn column(self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Landline => "landline",
            ContactField::Mobile => "mobile",
            ContactField::TollFree => "toll_free",
            ContactField::Whatsapp => "whatsapp",
            ContactField::Telegram => "telegram",
            ContactField::Viber => "viber",
            ContactField::Email => "email",
            ContactField::Website => "website",
            ContactField::Socials => "socials",
            ContactField::Title => "title",
        }
    }
}

/// Contact attributes; any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactFields {
    pub name: Option<SmolStr>,
    pub landline: Option<SmolStr>,
    pub mobile: Option<SmolStr>,
    pub toll_free: Option<SmolStr>,
    pub whatsapp: Option<SmolStr>,
    pub telegram: Option<SmolStr>,
    pub viber: Option<SmolStr>,
    pub email: Option<SmolStr>,
    pub website: Option<SmolStr>,
    pub socials: Option<SmolStr>,
    pub title: Option<SmolStr>,
}

impl ContactFields {
    pub fn get(&self, field: ContactField) -> Option<&SmolStr> {
        self.slot(field).as_ref()
    }

    pub fn set(&mut self, field: ContactField, value: Option<SmolStr>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: ContactField) -> &Option<SmolStr> {
        match field {
            ContactField::Name => &self.name,
            ContactField::Landline => &self.landline,
            ContactField::Mobile => &self.mobile,
            ContactField::TollFree => &self.toll_free,
            ContactField::Whatsapp => &self.whatsapp,
            ContactField::Telegram => &self.telegram,
            ContactField::Viber => &self.viber,
            ContactField::Email => &self.email,
            ContactField::Website => &self.website,
            ContactField::Socials => &self.socials,
            ContactField::Title => &self.title,
        }
    }

    fn slot_mut(&mut self, field: ContactField) -> &mut Option<SmolStr> {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Landline => &mut self.landline,
            ContactField::Mobile => &mut self.mobile,
            ContactField::TollFree => &mut self.toll_free,
            ContactField::Whatsapp => &mut self.whatsapp,
            ContactField::Telegram => &mut self.telegram,
            ContactField::Viber => &mut self.viber,
            ContactField::Email => &mut self.email,
            ContactField::Website => &mut self.website,
            ContactField::Socials => &mut self.socials,
            ContactField::Title => &mut self.title,
        }
    }
}

/// A record before the store has assigned it a position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub category: SmolStr,
    pub contact: ContactFields,
    /// `Some` marks the draft as already issued on that date.
    pub issued_at: Option<NaiveDate>,
}

impl RecordDraft {
    pub fn new(category: impl Into<SmolStr>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with(mut self, field: ContactField, value: impl Into<SmolStr>) -> Self {
        self.contact.set(field, Some(value.into()));
        self
    }

    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issued_at = Some(date);
        self
    }

    pub fn into_record(self, position: u64) -> ContactRecord {
        ContactRecord {
            position,
            category: self.category,
            contact: self.contact,
            issued: self.issued_at.is_some(),
            issued_at: self.issued_at,
        }
    }

    /// Stored field map. Every row carries `issued` and `issued_at` so the
    /// issuance commit only ever rewrites existing fields.
    pub fn to_row_map(&self) -> BTreeMap<SmolStr, FieldValue> {
        let mut map = BTreeMap::new();
        map.insert(SmolStr::new(CATEGORY), FieldValue::from(self.category.clone()));
        for field in ContactField::ALL {
            map.insert(
                SmolStr::new(field.column()),
                FieldValue::from(self.contact.get(field).cloned()),
            );
        }
        map.insert(SmolStr::new(ISSUED), FieldValue::Bool(self.issued_at.is_some()));
        map.insert(
            SmolStr::new(ISSUED_AT),
            FieldValue::from(self.issued_at.map(|d| d.format(DATE_FORMAT).to_string())),
        );
        map
    }
}

/// One inventory row plus its issuance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub position: u64,
    pub category: SmolStr,
    pub contact: ContactFields,
    pub issued: bool,
    pub issued_at: Option<NaiveDate>,
}

impl ContactRecord {
    /// Decode a stored row. Rows whose `issued` flag and `issued_at` date
    /// disagree are reported as corrupt rather than silently repaired.
    pub fn from_row<R: RowReadable>(position: u64, row: &R) -> Result<Self, StoreError> {
        let text = |name: &str| {
            row.get_field(name)
                .as_ref()
                .and_then(FieldValue::to_text)
        };

        let mut contact = ContactFields::default();
        for field in ContactField::ALL {
            contact.set(field, text(field.column()));
        }

        let issued = row.get_bool(ISSUED).unwrap_or(false);
        let issued_at = match row.get_str(ISSUED_AT) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                StoreError::Corrupt {
                    position,
                    reason: format!("bad {ISSUED_AT} {raw:?}: {e}"),
                }
            })?),
            None => None,
        };
        if issued != issued_at.is_some() {
            return Err(StoreError::Corrupt {
                position,
                reason: format!("{ISSUED}={issued} disagrees with {ISSUED_AT}={issued_at:?}"),
            });
        }

        Ok(Self {
            position,
            category: text(CATEGORY).unwrap_or_default(),
            contact,
            issued,
            issued_at,
        })
    }

    /// `(year, month)` of issuance, if issued.
    pub fn issued_month(&self) -> Option<(i32, u32)> {
        use chrono::Datelike;
        self.issued_at.map(|d| (d.year(), d.month()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowView;
    use crate::serialization::serialize;

    #[test]
    fn draft_round_trips_through_row() {
        let draft = RecordDraft::new("Restaurants")
            .with(ContactField::Name, "Trattoria Roma")
            .with(ContactField::Email, "ciao@roma.example");
        let (buf, _) = serialize(&draft.to_row_map()).unwrap();
        let row = RowView::parse(&buf).unwrap();
        let record = ContactRecord::from_row(5, &row).unwrap();

        assert_eq!(record, draft.into_record(5));
        assert!(!record.issued);
        assert_eq!(record.contact.mobile, None);
    }

    #[test]
    fn issued_draft_keeps_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let draft = RecordDraft::new("Cafes").issued_on(date);
        let (buf, _) = serialize(&draft.to_row_map()).unwrap();
        let record = ContactRecord::from_row(1, &RowView::parse(&buf).unwrap()).unwrap();
        assert!(record.issued);
        assert_eq!(record.issued_at, Some(date));
        assert_eq!(record.issued_month(), Some((2025, 3)));
    }

    #[test]
    fn numeric_cells_render_as_text() {
        let mut map = RecordDraft::new("Cafes").to_row_map();
        map.insert(SmolStr::new("mobile"), FieldValue::I64(79991234567));
        let (buf, _) = serialize(&map).unwrap();
        let record = ContactRecord::from_row(1, &RowView::parse(&buf).unwrap()).unwrap();
        assert_eq!(record.contact.mobile.as_deref(), Some("79991234567"));
    }

    #[test]
    fn issued_without_date_is_corrupt() {
        let mut map = RecordDraft::new("Cafes").to_row_map();
        map.insert(SmolStr::new(ISSUED), FieldValue::Bool(true));
        let (buf, _) = serialize(&map).unwrap();
        let err = ContactRecord::from_row(4, &RowView::parse(&buf).unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { position: 4, .. }));
    }
}
