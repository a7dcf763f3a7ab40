//! Shared fixtures for entity tests.

#![allow(dead_code)]

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vellum_entities::{Entity, EntityType};
use vellum_model::{EntitySchema, FieldDefinition, TypeRegistry};
use vellum_storage::SqliteStore;

/// Routes engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn store() -> SqliteStore {
    init_tracing();
    SqliteStore::open_in_memory().unwrap()
}

/// A comment-like type: a single title, up to four titles, unbounded tags and
/// a reference to another entity.
pub fn demo_schema() -> EntitySchema {
    EntitySchema::new("CommentDemo")
        .field(FieldDefinition::string("title"))
        .field(FieldDefinition::string("titles").max_items(4))
        .field(FieldDefinition::text("tags").max_items(0))
        .field(FieldDefinition::new("rating", "int"))
        .field(FieldDefinition::entity("parent"))
}

pub fn demo_type() -> Arc<EntityType> {
    Arc::new(EntityType::new(&demo_schema(), &TypeRegistry::default()).unwrap())
}

/// One field of every type, single and multiple.
pub fn all_fields_schema() -> EntitySchema {
    EntitySchema::new("all_fields")
        .field(FieldDefinition::string("string"))
        .field(FieldDefinition::string("strings").max_items(0))
        .field(FieldDefinition::text("text"))
        .field(FieldDefinition::text("texts").max_items(0))
        .field(FieldDefinition::integer("integer"))
        .field(FieldDefinition::integer("integers").max_items(0))
        .field(FieldDefinition::double("double"))
        .field(FieldDefinition::double("doubles").max_items(0))
        .field(FieldDefinition::boolean("boolean"))
        .field(FieldDefinition::boolean("booleans").max_items(0))
        .field(FieldDefinition::date("date"))
        .field(FieldDefinition::date("dates").max_items(0))
        .field(FieldDefinition::datetime("datetime"))
        .field(FieldDefinition::datetime("datetimes").max_items(0))
        .field(FieldDefinition::entity("entity"))
        .field(FieldDefinition::entity("entities").max_items(0))
}

pub fn all_fields_type() -> Arc<EntityType> {
    Arc::new(EntityType::new(&all_fields_schema(), &TypeRegistry::default()).unwrap())
}

/// An unsaved demo entity in language 1.
pub fn demo() -> Entity {
    Entity::new(demo_type(), 1).unwrap()
}

/// The exported value of every declared field, keyed by name.
pub fn field_values(entity: &Entity) -> serde_json::Value {
    let values = entity
        .entity_type()
        .fields()
        .iter()
        .map(|slot| (slot.name.clone(), entity.get(&slot.name).unwrap()))
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(values)
}
