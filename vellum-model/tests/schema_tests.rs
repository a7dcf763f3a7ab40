use pretty_assertions::assert_eq;
use vellum_model::{
    Content, EntitySchema, FieldDefinition, FieldType, RegistryConfig, Revision, TypeRegistry,
};
use vellum_types::{ContentId, LanguageId};

// ── FieldDefinition constructors ─────────────────────────────────

#[test]
fn definition_defaults_to_single_value() {
    let def = FieldDefinition::string("title");
    assert_eq!(def.name, "title");
    assert_eq!(def.type_name, "string");
    assert_eq!(def.max_items, 1);
}

#[test]
fn definition_max_items_builder() {
    let def = FieldDefinition::string("titles").max_items(4);
    assert_eq!(def.max_items, 4);
}

#[test]
fn shorthand_type_names() {
    assert_eq!(FieldDefinition::text("t").type_name, "text");
    assert_eq!(FieldDefinition::integer("t").type_name, "integer");
    assert_eq!(FieldDefinition::double("t").type_name, "double");
    assert_eq!(FieldDefinition::boolean("t").type_name, "boolean");
    assert_eq!(FieldDefinition::date("t").type_name, "date");
    assert_eq!(FieldDefinition::datetime("t").type_name, "datetime");
    assert_eq!(FieldDefinition::entity("t").type_name, "entity");
}

// ── EntitySchema ─────────────────────────────────────────────────

#[test]
fn schema_type_is_snake_cased() {
    assert_eq!(EntitySchema::new("Demo").entity_type, "demo");
    assert_eq!(EntitySchema::new("CommentDemo").entity_type, "comment_demo");
    assert_eq!(EntitySchema::new("comment_demo").entity_type, "comment_demo");
}

#[test]
fn schema_keeps_field_order() {
    let schema = EntitySchema::new("demo")
        .field(FieldDefinition::string("title"))
        .field(FieldDefinition::string("titles").max_items(4));
    let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["title", "titles"]);
    assert_eq!(schema.definition("titles").map(|d| d.max_items), Some(4));
    assert!(schema.definition("missing").is_none());
}

#[test]
fn schema_from_json_defaults_max_items() {
    let schema = EntitySchema::from_json(
        r#"{
            "entity_type": "demo",
            "fields": [
                { "name": "title", "type": "string" },
                { "name": "titles", "type": "string", "max_items": 4 }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(schema.fields[0].max_items, 1);
    assert_eq!(schema.fields[1].max_items, 4);
}

#[test]
fn schema_from_json_snake_cases_the_type() {
    let parsed =
        EntitySchema::from_json(r#"{ "entity_type": "CommentDemo", "fields": [] }"#).unwrap();
    assert_eq!(parsed.entity_type, "comment_demo");
    assert_eq!(parsed, EntitySchema::new("CommentDemo"));
}

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn default_registry_knows_aliases() {
    let registry = TypeRegistry::default();
    assert_eq!(registry.resolve("string"), Some(FieldType::String));
    assert_eq!(registry.resolve("int"), Some(FieldType::Integer));
    assert_eq!(registry.resolve("integer"), Some(FieldType::Integer));
    assert_eq!(registry.resolve("number"), Some(FieldType::Double));
    assert_eq!(registry.resolve("bool"), Some(FieldType::Boolean));
    assert_eq!(registry.resolve("entity"), Some(FieldType::Entity));
    assert_eq!(registry.resolve("nonexistent"), None);
}

#[test]
fn empty_registry_resolves_nothing() {
    let mut registry = TypeRegistry::empty();
    assert!(!registry.contains("string"));
    registry.register("short", FieldType::String);
    assert_eq!(registry.resolve("short"), Some(FieldType::String));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["short"]);
}

#[test]
fn registry_config_from_json() {
    let config = RegistryConfig::from_json(
        r#"{ "field_types": { "title": "string", "count": "integer" } }"#,
    )
    .unwrap();
    let registry = TypeRegistry::from_config(&config);
    assert_eq!(registry.resolve("title"), Some(FieldType::String));
    assert_eq!(registry.resolve("count"), Some(FieldType::Integer));
    assert!(!registry.contains("string"));
}

#[test]
fn registry_config_rejects_unknown_type() {
    assert!(RegistryConfig::from_json(r#"{ "field_types": { "x": "blob" } }"#).is_err());
}

// ── Records ──────────────────────────────────────────────────────

#[test]
fn new_records_are_published_and_unsaved() {
    let content = Content::new("demo");
    assert!(content.published);
    assert!(!content.is_persisted());
    assert!(content.id.is_none());

    let revision = Revision::new(LanguageId::new(1).unwrap());
    assert!(revision.published);
    assert!(!revision.is_persisted());
}

#[test]
fn deleted_content_keeps_its_id() {
    let mut content = Content::new("demo");
    content.mark_persisted(ContentId::from_raw(3));
    content.mark_deleted();
    assert!(!content.is_persisted());
    assert_eq!(content.id, Some(ContentId::from_raw(3)));

    content.forget();
    assert!(content.id.is_none());
}

#[test]
fn content_serializes_type_attribute() {
    let json = serde_json::to_value(Content::new("demo")).unwrap();
    assert_eq!(json["type"], "demo");
    assert_eq!(json["published"], true);
    assert!(json.get("persisted").is_none());
}
