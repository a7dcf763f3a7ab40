//! Versioned, schema-typed entities.
//!
//! An [`Entity`] binds an [`EntityType`] (a schema compiled against a
//! [`TypeRegistry`](vellum_model::TypeRegistry)) to one Content, one Revision
//! and one [`FieldCollection`](vellum_model::FieldCollection) per declared field.
//!
//! Writes go through [`Entity::save`], which persists Content, Revision and
//! every field row in a single unit of work. Reads go through [`Entity::find`],
//! which resolves the visible revision for a language and hydrates the fields.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vellum_entities::{Entity, EntityType, SaveOptions};
//! use vellum_model::{EntitySchema, FieldDefinition, TypeRegistry};
//! use vellum_storage::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = EntitySchema::new("Demo")
//!     .field(FieldDefinition::string("title"))
//!     .field(FieldDefinition::string("titles").max_items(4));
//! let demo = Arc::new(EntityType::new(&schema, &TypeRegistry::default())?);
//! let store = SqliteStore::open_in_memory()?;
//!
//! let mut entity = Entity::new(demo.clone(), 1)?;
//! entity.set("titles", serde_json::json!(["one", "two"]))?;
//! entity.save(&store, SaveOptions::default())?;
//!
//! let found = Entity::find(&store, demo, entity.id().unwrap(), 1, None)?;
//! assert_eq!(found.get("titles")?, serde_json::json!(["one", "two"]));
//! # Ok(())
//! # }
//! ```

mod entity;
mod entity_type;
mod error;
mod persistence;

pub use entity::Entity;
pub use entity_type::{
    Attribute, CONTENT_ATTRIBUTES, ContentAttribute, EntityType, FieldSlot, REVISION_ATTRIBUTES,
    RevisionAttribute,
};
pub use error::{EntityError, EntityResult};
pub use persistence::SaveOptions;
