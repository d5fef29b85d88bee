use crate::inventory::{ContactField, ContactRecord};
use serde::Serialize;
use smol_str::SmolStr;

/// Rendered in place of any absent or blank field.
pub const PLACEHOLDER: &str = "—";

/// Public shape of an allocated record. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub name: SmolStr,
    pub landline: SmolStr,
    pub mobile: SmolStr,
    pub toll_free: SmolStr,
    pub whatsapp: SmolStr,
    pub telegram: SmolStr,
    pub viber: SmolStr,
    pub email: SmolStr,
    pub website: SmolStr,
    pub socials: SmolStr,
    pub title: SmolStr,
    pub category: SmolStr,
}

fn or_placeholder(value: Option<&SmolStr>) -> SmolStr {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => SmolStr::new(v),
        _ => SmolStr::new_static(PLACEHOLDER),
    }
}

impl ContactCard {
    pub fn project(record: &ContactRecord) -> Self {
        let field = |f: ContactField| or_placeholder(record.contact.get(f));
        Self {
            name: field(ContactField::Name),
            landline: field(ContactField::Landline),
            mobile: field(ContactField::Mobile),
            toll_free: field(ContactField::TollFree),
            whatsapp: field(ContactField::Whatsapp),
            telegram: field(ContactField::Telegram),
            viber: field(ContactField::Viber),
            email: field(ContactField::Email),
            website: field(ContactField::Website),
            socials: field(ContactField::Socials),
            title: field(ContactField::Title),
            category: or_placeholder(Some(&record.category)),
        }
    }
}

impl From<&ContactRecord> for ContactCard {
    fn from(record: &ContactRecord) -> Self {
        Self::project(record)
    }
}
