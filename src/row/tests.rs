// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════
mod row_tests {
    use crate::error::RecordError;
    use crate::field_value::FieldValue;
    use crate::row::{RowMut, RowReadable, RowView};
    use crate::serialization::serialize;
    use crate::types::*;
    use smol_str::SmolStr;
    use std::collections::BTreeMap;

    fn make_contact_row() -> Vec<u8> {
        let mut map = BTreeMap::new();
        map.insert(SmolStr::from("category"), FieldValue::from("Restaurants"));
        map.insert(SmolStr::from("name"), FieldValue::from("Trattoria Roma"));
        map.insert(SmolStr::from("mobile"), FieldValue::from("+7 999 000 11 22"));
        map.insert(SmolStr::from("email"), FieldValue::Null);
        map.insert(SmolStr::from("issued"), FieldValue::from(false));
        map.insert(SmolStr::from("issued_at"), FieldValue::Null);
        map.insert(SmolStr::from("seq"), FieldValue::from(42u64));
        serialize(&map).unwrap().0
    }

    /// Exactly 4 fields, so lookups take the linear-search path.
    fn make_linear_row() -> Vec<u8> {
        let mut map = BTreeMap::new();
        map.insert(SmolStr::from("a"), FieldValue::from("alpha"));
        map.insert(SmolStr::from("b"), FieldValue::from(1i64));
        map.insert(SmolStr::from("c"), FieldValue::Null);
        map.insert(SmolStr::from("d"), FieldValue::from(true));
        serialize(&map).unwrap().0
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reading
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_read_flat_fields() {
        let buf = make_contact_row();
        let row = RowView::parse(&buf).unwrap();

        assert_eq!(row.field_count(), 7);
        assert_eq!(row.get_str("category"), Some("Restaurants"));
        assert_eq!(row.get_str("name"), Some("Trattoria Roma"));
        assert_eq!(row.get_bool("issued"), Some(false));
        assert_eq!(row.get_u64("seq"), Some(42));
        assert_eq!(row.field_type("email"), Some(TAG_NULL));
        assert!(row.get_str("email").is_none());
        assert!(!row.has_field("website"));
    }

    #[test]
    fn test_linear_search_path() {
        let buf = make_linear_row();
        let row = RowView::parse(&buf).unwrap();
        assert_eq!(row.get_str("a"), Some("alpha"));
        assert_eq!(row.get_i64("b"), Some(1));
        assert_eq!(row.get_field("c"), Some(FieldValue::Null));
        assert_eq!(row.get_bool("d"), Some(true));
        assert!(row.get_str("z").is_none());
    }

    #[test]
    fn test_typed_getter_rejects_other_tags() {
        let buf = make_contact_row();
        let row = RowView::parse(&buf).unwrap();
        assert!(row.get_bool("name").is_none());
        assert!(row.get_i64("seq").is_none());
        assert!(row.get_str("issued").is_none());
    }

    #[test]
    fn test_iter_fields_visits_every_field() {
        let buf = make_contact_row();
        let row = RowView::parse(&buf).unwrap();
        let iter = row.iter_fields();
        assert_eq!(iter.len(), 7);
        let nulls = row
            .iter_fields()
            .filter(|f| f.type_tag == TAG_NULL)
            .count();
        assert_eq!(nulls, 2);
    }

    #[test]
    fn test_empty_row() {
        let (buf, fc) = serialize(&BTreeMap::new()).unwrap();
        assert_eq!(fc, 0);
        let row = RowView::parse(&buf).unwrap();
        assert!(!row.has_field("anything"));
        assert!(row.get_raw("anything").is_none());
        assert_eq!(row.iter_fields().count(), 0);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_set_bool_in_place() {
        let mut row = RowMut::from_vec(make_contact_row()).unwrap();
        let len_before = row.data_buf.len();
        row.set_bool("issued", true).unwrap();
        assert_eq!(row.get_bool("issued"), Some(true));
        assert_eq!(row.data_buf.len(), len_before);
        assert_eq!(row.generation, 0);
    }

    #[test]
    fn test_set_bool_type_mismatch() {
        let mut row = RowMut::from_vec(make_contact_row()).unwrap();
        let err = row.set_bool("name", true).unwrap_err();
        assert!(matches!(
            err,
            RecordError::TypeMismatch {
                expected: TAG_BOOL,
                actual: TAG_STR
            }
        ));
    }

    #[test]
    fn test_set_field_null_to_str_splices() {
        let mut row = RowMut::from_vec(make_contact_row()).unwrap();
        row.set_field("issued_at", &FieldValue::from("2026-10-16"))
            .unwrap();

        assert_eq!(row.get_str("issued_at"), Some("2026-10-16"));
        assert_eq!(row.generation, 1);
        // Every other field survives the splice untouched.
        assert_eq!(row.get_str("category"), Some("Restaurants"));
        assert_eq!(row.get_str("name"), Some("Trattoria Roma"));
        assert_eq!(row.get_str("mobile"), Some("+7 999 000 11 22"));
        assert_eq!(row.get_bool("issued"), Some(false));
        assert_eq!(row.get_u64("seq"), Some(42));
        assert_eq!(row.field_type("email"), Some(TAG_NULL));

        // And the result still validates as a stored row.
        let bytes = row.into_bytes();
        assert!(RowView::parse(&bytes).is_ok());
    }

    #[test]
    fn test_set_field_shrink_and_null_again() {
        let mut row = RowMut::from_vec(make_contact_row()).unwrap();
        row.set_field("name", &FieldValue::from("Roma")).unwrap();
        assert_eq!(row.get_str("name"), Some("Roma"));
        row.set_null("mobile").unwrap();
        assert_eq!(row.field_type("mobile"), Some(TAG_NULL));
        assert_eq!(row.get_str("category"), Some("Restaurants"));
        assert_eq!(row.get_u64("seq"), Some(42));
    }

    #[test]
    fn test_set_field_missing() {
        let mut row = RowMut::from_vec(make_linear_row()).unwrap();
        let err = row.set_field("zzz", &FieldValue::from(1i64)).unwrap_err();
        assert!(matches!(err, RecordError::FieldNotFound));
    }

    #[test]
    fn test_add_field_keeps_index_sorted() {
        let mut row = RowMut::from_vec(make_linear_row()).unwrap();
        row.add_field("issued_at", &FieldValue::from("2026-01-31"))
            .unwrap();
        assert_eq!(row.field_count(), 5);
        assert_eq!(row.get_str("issued_at"), Some("2026-01-31"));
        assert_eq!(row.get_str("a"), Some("alpha"));
        assert_eq!(row.get_bool("d"), Some(true));

        let hashes: Vec<u64> = (0..row.field_count())
            .map(|i| row.read_hash(i).unwrap())
            .collect();
        assert!(hashes.windows(2).all(|w| w[0] < w[1]));
        assert!(matches!(
            row.add_field("a", &FieldValue::Null),
            Err(RecordError::FieldExists)
        ));
    }

    #[test]
    fn test_put_field_adds_or_sets() {
        let mut row = RowMut::from_vec(make_linear_row()).unwrap();
        row.put_field("issued", &FieldValue::from(true)).unwrap();
        row.put_field("a", &FieldValue::from("beta")).unwrap();
        assert_eq!(row.get_bool("issued"), Some(true));
        assert_eq!(row.get_str("a"), Some("beta"));
        assert_eq!(row.field_count(), 5);
    }
}
