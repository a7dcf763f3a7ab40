use proptest::prelude::*;
use vellum_types::{ContentId, Error, FieldKey, LanguageId, RevisionId};

// ── Row ids ──────────────────────────────────────────────────────

#[test]
fn row_id_roundtrips_raw_value() {
    let id = ContentId::from_raw(42);
    assert_eq!(id.get(), 42);
    assert_eq!(i64::from(id), 42);
}

#[test]
fn row_id_display_is_plain_number() {
    assert_eq!(RevisionId::from_raw(7).to_string(), "7");
}

#[test]
fn row_id_parses_from_string() {
    let id: ContentId = " 12 ".parse().unwrap();
    assert_eq!(id, ContentId::from_raw(12));
}

#[test]
fn row_id_rejects_garbage() {
    let err = "twelve".parse::<ContentId>().unwrap_err();
    assert!(matches!(err, Error::InvalidId(_)));
}

#[test]
fn row_id_serializes_transparently() {
    let json = serde_json::to_string(&ContentId::from_raw(5)).unwrap();
    assert_eq!(json, "5");
}

#[test]
fn row_ids_order_by_value() {
    assert!(RevisionId::from_raw(1) < RevisionId::from_raw(2));
}

// ── LanguageId ───────────────────────────────────────────────────

#[test]
fn language_id_accepts_positive() {
    assert_eq!(LanguageId::new(1).unwrap().get(), 1);
}

#[test]
fn language_id_rejects_zero() {
    assert!(matches!(LanguageId::new(0), Err(Error::InvalidLanguage(0))));
}

#[test]
fn language_id_rejects_negative() {
    assert!(matches!(LanguageId::new(-3), Err(Error::InvalidLanguage(-3))));
}

#[test]
fn language_id_deserialize_validates() {
    assert!(serde_json::from_str::<LanguageId>("2").is_ok());
    assert!(serde_json::from_str::<LanguageId>("0").is_err());
}

// ── FieldKey ─────────────────────────────────────────────────────

#[test]
fn field_keys_are_unique() {
    assert_ne!(FieldKey::new(), FieldKey::new());
}

#[test]
fn field_keys_are_monotonic() {
    let a = FieldKey::new();
    let b = FieldKey::new();
    assert!(a < b);
}

#[test]
fn field_key_copies_compare_equal() {
    let a = FieldKey::new();
    let b = a;
    assert_eq!(a, b);
}

#[test]
fn field_key_parses_its_display() {
    let key = FieldKey::new();
    let parsed: FieldKey = key.to_string().parse().unwrap();
    assert_eq!(parsed, key);
}

proptest! {
    #[test]
    fn language_id_valid_iff_positive(raw in any::<i64>()) {
        prop_assert_eq!(LanguageId::new(raw).is_ok(), raw > 0);
    }
}
