mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use vellum_entities::{Attribute, ContentAttribute, Entity, EntityError, EntityType};
use vellum_model::{EntitySchema, FieldDefinition, FieldError, FieldType, TypeRegistry};

use common::{demo, demo_schema, demo_type};

fn compile(schema: &EntitySchema) -> Result<EntityType, EntityError> {
    EntityType::new(schema, &TypeRegistry::default())
}

// ── Entity types ─────────────────────────────────────────────────

#[test]
fn entity_type_resolves_fields_in_schema_order() {
    let entity_type = demo_type();
    assert_eq!(entity_type.name(), "comment_demo");
    let names: Vec<&str> = entity_type.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["title", "titles", "tags", "rating", "parent"]);
    assert_eq!(entity_type.fields()[3].field_type, FieldType::Integer);
    assert_eq!(
        entity_type.field_types(),
        vec![FieldType::String, FieldType::Text, FieldType::Integer, FieldType::Entity]
    );
}

#[test]
fn entity_type_routes_shared_published_to_content() {
    let entity_type = demo_type();
    assert_eq!(
        entity_type.attribute("published"),
        Some(Attribute::Content(ContentAttribute::Published))
    );
    assert_eq!(entity_type.attribute("titles"), Some(Attribute::Field(1)));
    assert_eq!(entity_type.field_index("language_id"), None);
    assert_eq!(entity_type.attribute("missing"), None);
}

#[test]
fn reserved_field_names_are_rejected() {
    for name in ["id", "created_at", "type", "published", "language_id", "updated_at"] {
        let schema = EntitySchema::new("demo").field(FieldDefinition::string(name));
        let err = compile(&schema).unwrap_err();
        assert!(
            matches!(&err, EntityError::ReservedFieldName { field, entity_type }
                if field == name && entity_type == "demo"),
            "{name}: {err}"
        );
    }
}

#[test]
fn unknown_field_type_is_rejected() {
    let schema = EntitySchema::new("demo").field(FieldDefinition::new("score", "float"));
    let err = compile(&schema).unwrap_err();
    assert!(matches!(
        &err,
        EntityError::InvalidFieldType { field, type_name, .. } if field == "score" && type_name == "float"
    ));
    assert_eq!(err.to_string(), "unknown type 'float' for field 'score' in 'demo'");
}

#[test]
fn registry_decides_which_type_names_exist() {
    let mut registry = TypeRegistry::empty();
    let schema = EntitySchema::new("demo").field(FieldDefinition::new("score", "float"));
    assert!(EntityType::new(&schema, &registry).is_err());

    registry.register("float", FieldType::Double);
    let entity_type = EntityType::new(&schema, &registry).unwrap();
    assert_eq!(entity_type.fields()[0].field_type, FieldType::Double);
}

#[test]
fn duplicate_field_names_are_rejected() {
    let schema = EntitySchema::new("demo")
        .field(FieldDefinition::string("title"))
        .field(FieldDefinition::text("title"));
    assert!(matches!(
        compile(&schema),
        Err(EntityError::DuplicateFieldName { field, .. }) if field == "title"
    ));
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_entity_has_no_ids_and_empty_fields() {
    let entity = demo();
    assert_eq!(entity.id(), None);
    assert_eq!(entity.revision_id(), None);
    assert_eq!(entity.language_id().get(), 1);
    assert_eq!(entity.content_type(), "comment_demo");
    assert!(entity.is_published());
    assert!(entity.is_revision_published());
    assert!(!entity.is_persisted());
    assert_eq!(entity.get("title").unwrap(), json!(null));
    assert_eq!(entity.get("titles").unwrap(), json!([]));
}

#[test]
fn language_must_be_positive() {
    for language in [0, -1, -42] {
        assert!(matches!(
            Entity::new(demo_type(), language),
            Err(EntityError::InvalidLanguage(l)) if l == language
        ));
    }
}

#[test]
fn language_is_checked_before_the_schema() {
    let schema = EntitySchema::new("demo").field(FieldDefinition::string("id"));
    let err = Entity::from_schema(&schema, &TypeRegistry::default(), 0).unwrap_err();
    assert!(matches!(err, EntityError::InvalidLanguage(0)));

    let err = Entity::from_schema(&schema, &TypeRegistry::default(), 1).unwrap_err();
    assert!(matches!(err, EntityError::ReservedFieldName { .. }));
}

#[test]
fn from_schema_builds_a_usable_entity() {
    let mut entity = Entity::from_schema(&demo_schema(), &TypeRegistry::default(), 3).unwrap();
    entity.set("title", "hello").unwrap();
    assert_eq!(entity.language_id().get(), 3);
    assert_eq!(entity.get("title").unwrap(), json!("hello"));
}

// ── Attribute routing ────────────────────────────────────────────

#[test]
fn record_attributes_read_by_name() {
    let entity = demo();
    assert_eq!(entity.get("id").unwrap(), json!(null));
    assert_eq!(entity.get("type").unwrap(), json!("comment_demo"));
    assert_eq!(entity.get("published").unwrap(), json!(true));
    assert_eq!(entity.get("language_id").unwrap(), json!(1));
    assert_eq!(entity.get("created_at").unwrap(), json!(null));
    assert_eq!(entity.get("updated_at").unwrap(), json!(null));
}

#[test]
fn writable_record_attributes() {
    let mut entity = demo();
    entity.set("published", "0").unwrap();
    assert!(!entity.is_published());
    entity.set("published", true).unwrap();
    assert!(entity.is_published());

    entity.set("type", "article").unwrap();
    assert_eq!(entity.content_type(), "article");

    entity.set("language_id", 2).unwrap();
    assert_eq!(entity.language_id().get(), 2);
}

#[test]
fn read_only_and_malformed_record_attributes_are_rejected() {
    let mut entity = demo();
    for (name, value) in [
        ("id", json!(5)),
        ("created_at", json!("2024-01-01")),
        ("updated_at", json!("2024-01-01")),
        ("published", json!("maybe")),
        ("type", json!("")),
        ("language_id", json!("two")),
    ] {
        let err = entity.set(name, value).unwrap_err();
        assert!(
            matches!(&err, EntityError::InvalidAttributeValue { attribute, .. } if attribute == name),
            "{name}: {err}"
        );
    }
    assert!(matches!(
        entity.set("language_id", 0),
        Err(EntityError::InvalidLanguage(0))
    ));
    assert_eq!(entity.language_id().get(), 1);
}

#[test]
fn unknown_names_are_rejected() {
    let mut entity = demo();
    assert!(matches!(
        entity.set("subtitle", "x"),
        Err(EntityError::NonExistentField { field, entity_type })
            if field == "subtitle" && entity_type == "comment_demo"
    ));
    assert!(matches!(entity.get("subtitle"), Err(EntityError::NonExistentField { .. })));
    assert!(matches!(entity.field("subtitle"), Err(EntityError::NonExistentField { .. })));
    assert!(!entity.has_field("subtitle"));
    assert!(!entity.has_field("published"));
    assert!(entity.has_field("title"));
}

// ── Field assignment ─────────────────────────────────────────────

#[test]
fn scalar_assignment_to_a_multiple_field_fails() {
    let mut entity = demo();
    let err = entity.set("titles", "one").unwrap_err();
    assert!(matches!(&err, EntityError::MultipleFieldAssignment(field) if field == "titles"));
    assert_eq!(
        err.to_string(),
        "cannot assign a single value to the multiple-valued field 'titles'"
    );
}

#[test]
fn list_assignment_replaces_the_collection() {
    let mut entity = demo();
    entity.set("titles", json!(["a", "b", "c"])).unwrap();
    assert_eq!(entity.get("titles").unwrap(), json!(["a", "b", "c"]));

    entity.set("titles", json!(["z"])).unwrap();
    assert_eq!(entity.get("titles").unwrap(), json!(["z"]));
    assert_eq!(entity.field("titles").unwrap().len(), 1);
}

#[test]
fn single_field_accepts_a_one_element_list() {
    let mut entity = demo();
    entity.set("title", json!(["only"])).unwrap();
    assert_eq!(entity.get("title").unwrap(), json!("only"));
}

#[test]
fn over_capacity_list_leaves_the_field_untouched() {
    let mut entity = demo();
    entity.set("titles", json!(["a", "b"])).unwrap();
    let err = entity
        .set("titles", json!(["1", "2", "3", "4", "5"]))
        .unwrap_err();
    assert!(matches!(err, EntityError::Field(FieldError::ItemCount { max: 4 })));
    assert_eq!(entity.get("titles").unwrap(), json!(["a", "b"]));
}

#[test]
fn invalid_value_leaves_the_field_untouched() {
    let mut entity = demo();
    entity.set("rating", "12").unwrap();
    assert_eq!(entity.get("rating").unwrap(), json!(12));

    let err = entity.set("rating", "twelve").unwrap_err();
    assert!(matches!(
        err,
        EntityError::Field(FieldError::InvalidValue { field_type: FieldType::Integer, .. })
    ));
    assert_eq!(entity.get("rating").unwrap(), json!(12));
}

#[test]
fn null_clears_a_single_field() {
    let mut entity = demo();
    entity.set("title", "hello").unwrap();
    entity.set("title", json!(null)).unwrap();
    assert_eq!(entity.get("title").unwrap(), json!(null));
    assert!(entity.field("title").unwrap().is_empty());
}

#[test]
fn unbounded_field_takes_any_number_of_values() {
    let mut entity = demo();
    let tags: Vec<String> = (0..25).map(|i| format!("tag-{i}")).collect();
    entity.set("tags", json!(tags)).unwrap();
    assert_eq!(entity.field("tags").unwrap().len(), 25);
}

#[test]
fn collections_are_reachable_for_positional_edits() {
    let mut entity = demo();
    entity.set("titles", json!(["a", "b"])).unwrap();
    let titles = entity.field_mut("titles").unwrap();
    titles.push("c").unwrap();
    titles.set(0, "A").unwrap();
    assert_eq!(entity.get("titles").unwrap(), json!(["A", "b", "c"]));
}

// ── Derived entities ─────────────────────────────────────────────

#[test]
fn new_revision_shares_content_with_empty_fields() {
    let mut entity = demo();
    entity.set("title", "original").unwrap();
    entity.set("type", "article").unwrap();

    let sibling = entity.new_revision(None).unwrap();
    assert_eq!(sibling.content(), entity.content());
    assert_eq!(sibling.language_id().get(), 1);
    assert_eq!(sibling.revision_id(), None);
    assert_eq!(sibling.get("title").unwrap(), json!(null));
    assert_eq!(entity.get("title").unwrap(), json!("original"));

    let translation = entity.new_revision(Some(2)).unwrap();
    assert_eq!(translation.language_id().get(), 2);
    assert!(matches!(
        entity.new_revision(Some(0)),
        Err(EntityError::InvalidLanguage(0))
    ));
}

#[test]
fn reference_requires_a_saved_entity() {
    assert!(matches!(demo().reference(), Err(EntityError::NotPersisted)));
}

#[test]
fn export_lists_records_and_every_declared_field() {
    let mut entity = demo();
    entity.set("title", "hello").unwrap();
    entity.set("tags", json!(["x", "y"])).unwrap();

    let exported = entity.export().unwrap();
    assert_eq!(exported["content"]["type"], json!("comment_demo"));
    assert_eq!(exported["content"]["published"], json!(true));
    assert_eq!(exported["revision"]["language_id"], json!(1));
    assert_eq!(exported["title"], json!("hello"));
    assert_eq!(exported["titles"], json!([]));
    assert_eq!(exported["tags"], json!(["x", "y"]));
    assert_eq!(exported["rating"], json!(null));
    assert_eq!(exported["parent"], json!(null));
    assert_eq!(exported.as_object().unwrap().len(), 7);
}
