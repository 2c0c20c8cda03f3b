use super::*;
use crate::{
    ErrorKind, PropertyError,
    node::PropertyFlag,
    snapshot::SnapshotError,
    tag::TagError,
    types::{StorageType, TypeError, WireType},
};

fn user() -> Declaration {
    Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("name", "String", r#"index:"hash" unique"#),
            FieldDecl::new("created", "i64", "date"),
            FieldDecl::new("cache", "Vec<u8>", "transient"),
            FieldDecl::new("avatar", "Vec<u8>", r#"nameInDb:"picture""#),
        ],
    )
}

fn build(decl: &Declaration) -> EntityDef {
    build_entity(decl).expect("declaration should build")
}

#[test]
fn declaration_numbers_fields_in_order() {
    let decl = user();
    let indexes: Vec<_> = decl.fields.iter().map(|f| f.index).collect();

    assert_eq!(indexes, [0, 1, 2, 3, 4]);
}

#[test]
fn builds_properties_in_declaration_order() {
    let def = build(&user());
    let names: Vec<_> = def.properties.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, ["id", "name", "created", "avatar"]);
    assert_eq!(def.id_property().name, "id");
}

#[test]
fn transient_fields_are_dropped_whatever_else_they_carry() {
    let decl = Declaration::new(
        "Item",
        [
            FieldDecl::new("id", "u64", "id"),
            // an unknown type would fail if it reached type mapping
            FieldDecl::new("scratch", "HashMap<u8,u8>", "transient index unique"),
        ],
    );
    let def = build(&decl);

    assert_eq!(def.properties.len(), 1);
    assert!(def.properties.iter().all(|p| p.name != "scratch"));
}

#[test]
fn resolves_types_and_flags() {
    let def = build(&user());

    let name = &def.properties[1];
    assert_eq!(name.storage_type(), StorageType::String);
    assert_eq!(name.wire_type(), WireType::UOffsetT);
    assert_eq!(
        name.flags.iter().collect::<Vec<_>>(),
        [
            PropertyFlag::Indexed,
            PropertyFlag::IndexHash,
            PropertyFlag::Unique
        ]
    );

    let created = &def.properties[2];
    assert_eq!(created.storage_type(), StorageType::Date);
    assert_eq!(created.wire_type(), WireType::Int64);

    assert!(def.properties[0].is_id());
    assert!(def.properties[0].flags.contains(PropertyFlag::Id));
}

#[test]
fn storage_name_defaults_to_field_name() {
    let def = build(&user());

    assert_eq!(def.properties[0].storage_name, "id");
    assert_eq!(def.properties[3].storage_name, "picture");
}

#[test]
fn empty_name_override_is_rejected() {
    let decl = Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("name", "String", r#"nameInDb:"""#),
        ],
    );
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EntityShape);
    assert_eq!(
        err,
        Error::Entity(EntityError::EmptyStorageName {
            entity: "User".into(),
            property: "name".into(),
        })
    );
}

#[test]
fn clashing_storage_names_are_rejected() {
    let decl = Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("name", "String", ""),
            FieldDecl::new("alias", "String", r#"nameInDb:"name""#),
        ],
    );
    let err = build_entity(&decl).unwrap_err();

    assert!(matches!(
        err,
        Error::Entity(EntityError::DuplicateStorageName { ref first, ref second, .. })
            if first == "name" && second == "alias"
    ));
}

#[test]
fn missing_id_is_an_entity_shape_error() {
    let decl = Declaration::new("User", [FieldDecl::new("name", "String", "")]);
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EntityShape);
    assert_eq!(err.to_string(), "field annotated `id` is missing on entity User");
}

#[test]
fn second_id_is_an_entity_shape_error() {
    let decl = Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("other", "u64", "id"),
        ],
    );
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EntityShape);
    assert_eq!(
        err.to_string(),
        "struct User has multiple ID properties - id and other"
    );
}

#[test]
fn only_transient_fields_means_no_properties() {
    let decl = Declaration::new("Ghost", [FieldDecl::new("id", "u64", "id transient")]);
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(
        err,
        Error::Entity(EntityError::NoProperties {
            entity: "Ghost".into()
        })
    );
}

#[test]
fn tag_errors_carry_property_and_entity() {
    let decl = Declaration::new("User", [FieldDecl::new("id", "u64", "id id")]);
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TagFormat);
    assert_eq!(
        err,
        Error::Property {
            entity: "User".into(),
            property: "id".into(),
            source: PropertyError::Tag(TagError::Duplicate { key: "id".into() }),
        }
    );
    assert_eq!(
        err.to_string(),
        "duplicate annotation id on property id, entity User"
    );
}

#[test]
fn type_errors_carry_property_and_entity() {
    let decl = Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("born", "String", "date"),
        ],
    );
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeResolution);
    assert!(matches!(
        err,
        Error::Property {
            ref property,
            source: PropertyError::Type(TypeError::DateRequiresLong { .. }),
            ..
        } if property == "born"
    ));
}

#[test]
fn unknown_type_fails_the_entity() {
    let decl = Declaration::new(
        "User",
        [
            FieldDecl::new("id", "u64", "id"),
            FieldDecl::new("score", "usize", ""),
        ],
    );
    let err = build_entity(&decl).unwrap_err();

    assert_eq!(err.to_string(), "unknown type usize on property score, entity User");
}

#[test]
fn derive_model_is_idempotent_against_its_own_snapshot() {
    let decls = [user()];
    let options = DeriveOptions::default();

    let (first, snapshot) =
        derive_model("app", &decls, &ModelSnapshot::new(), &options).expect("first run");
    let (second, again) = derive_model("app", &decls, &snapshot, &options).expect("second run");

    assert_eq!(first, second);
    assert_eq!(snapshot, again);
}

#[test]
fn derive_model_stops_at_first_failing_entity() {
    let decls = [
        user(),
        Declaration::new("Broken", [FieldDecl::new("name", "String", "")]),
    ];
    let err = derive_model("app", &decls, &ModelSnapshot::new(), &DeriveOptions::default())
        .unwrap_err();

    assert_eq!(
        err,
        Error::Entity(EntityError::MissingId {
            entity: "Broken".into()
        })
    );
}

#[test]
fn derive_model_rejects_duplicate_entity_names() {
    let decls = [user(), user()];
    let err = derive_model("app", &decls, &ModelSnapshot::new(), &DeriveOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EntityShape);
}

#[test]
fn derive_model_attaches_vtable_offsets() {
    let (model, _) = derive_model(
        "app",
        &[user()],
        &ModelSnapshot::new(),
        &DeriveOptions::default(),
    )
    .expect("model should derive");
    let offsets: Vec<_> = model.entities[0]
        .properties
        .iter()
        .map(|p| p.vtable_offset)
        .collect();

    assert_eq!(offsets, [4, 6, 8, 10]);
}

#[test]
fn derive_model_refuses_snapshot_with_shared_property_slot() {
    let decls = [user()];
    let options = DeriveOptions::default();
    let (_, mut snapshot) =
        derive_model("app", &decls, &ModelSnapshot::new(), &options).expect("first run");

    let first_id = snapshot.entities[0].properties[0].id.id;
    snapshot.entities[0].properties[1].id.id = first_id;
    let err = derive_model("app", &decls, &snapshot, &options).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Snapshot);
    assert!(matches!(
        err,
        Error::Snapshot(SnapshotError::DuplicatePropertyId { ref first, ref second, .. })
            if first == "id" && second == "name"
    ));
}
