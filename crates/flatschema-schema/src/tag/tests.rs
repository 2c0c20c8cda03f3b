use super::*;
use proptest::prelude::*;

fn parse(text: &str) -> Capabilities {
    Capabilities::parse(text).expect("tag should parse")
}

#[test]
fn empty_text_is_empty_set() {
    assert!(parse("").is_empty());
    assert!(parse("   \t ").is_empty());
}

#[test]
fn parses_bare_and_valued_capabilities() {
    let caps = parse(r#"id unique index:"hash""#);

    assert_eq!(
        caps.iter().cloned().collect::<Vec<_>>(),
        [
            Capability::Id,
            Capability::Unique,
            Capability::Index(IndexKind::Hash)
        ]
    );
    assert!(caps.is_id());
    assert!(caps.is_unique());
    assert_eq!(caps.index(), Some(IndexKind::Hash));
    assert_eq!(caps.get(CapabilityKey::Index).and_then(Capability::value), Some("hash"));
    assert_eq!(caps.get(CapabilityKey::Id).and_then(Capability::value), None);
}

#[test]
fn keys_are_case_insensitive() {
    let caps = parse(r#"ID NameInDb:"user_name" Index:"HASH64""#);

    assert!(caps.is_id());
    assert_eq!(caps.name_in_db(), Some("user_name"));
    assert_eq!(caps.index(), Some(IndexKind::Hash64));
}

#[test]
fn bare_index_uses_default_kind() {
    let caps = parse("index");
    assert_eq!(caps.index(), Some(IndexKind::Default));
    assert_eq!(caps.get(CapabilityKey::Index).and_then(Capability::value), None);
}

#[test]
fn bare_name_in_db_is_kept_empty() {
    // the entity builder rejects the empty override with property context
    assert_eq!(parse("nameindb").name_in_db(), Some(""));
}

#[test]
fn duplicate_key_names_the_key() {
    let err = Capabilities::parse("id id").unwrap_err();
    assert_eq!(err, TagError::Duplicate { key: "id".into() });
    assert_eq!(err.to_string(), "duplicate annotation id");
}

#[test]
fn duplicate_detection_ignores_case() {
    let err = Capabilities::parse("Unique UNIQUE").unwrap_err();
    assert_eq!(
        err,
        TagError::Duplicate {
            key: "unique".into()
        }
    );
}

#[test]
fn duplicate_index_with_different_values_is_rejected() {
    let err = Capabilities::parse(r#"index:"hash" index"#).unwrap_err();
    assert!(matches!(err, TagError::Duplicate { ref key } if key == "index"));
}

#[test]
fn unknown_key_is_rejected() {
    let err = Capabilities::parse("id lazy").unwrap_err();
    assert_eq!(err, TagError::UnknownKey { key: "lazy".into() });
}

#[test]
fn unknown_index_kind_is_rejected() {
    let err = Capabilities::parse(r#"index:"btree""#).unwrap_err();
    assert_eq!(
        err,
        TagError::UnknownIndexKind {
            value: "btree".into()
        }
    );
}

#[test]
fn value_on_flag_capability_is_rejected() {
    let err = Capabilities::parse(r#"unique:"yes""#).unwrap_err();
    assert_eq!(
        err,
        TagError::UnexpectedValue {
            key: CapabilityKey::Unique
        }
    );
}

#[test]
fn malformed_value_names_the_key() {
    let err = Capabilities::parse("nameInDb:plain").unwrap_err();
    assert!(err.to_string().contains("for nameInDb"), "{err}");
}

#[test]
fn serializes_as_key_value_map() {
    let caps = parse(r#"id index:"value" nameindb:"n""#);
    let json = serde_json::to_value(&caps).expect("capabilities should serialize");

    assert_eq!(
        json,
        serde_json::json!({ "id": null, "index": "value", "nameindb": "n" })
    );
}

fn separator() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 1..4)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn whitespace_between_tokens_does_not_change_result(
        a in separator(),
        b in separator(),
        c in separator(),
    ) {
        let text = format!("{a}id{b}index:\"hash\"{c}unique");
        let caps = Capabilities::parse(&text).expect("tag should parse");

        prop_assert_eq!(caps, parse(r#"id index:"hash" unique"#));
    }

    #[test]
    fn name_in_db_value_round_trips(name in "[a-zA-Z_][a-zA-Z0-9_: ]{0,20}[a-zA-Z0-9_]") {
        let caps = Capabilities::parse(&format!("nameInDb:\"{name}\"")).expect("tag should parse");

        prop_assert_eq!(caps.name_in_db(), Some(name.trim()));
    }
}
