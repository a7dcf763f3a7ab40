//! Content model for vellum.
//!
//! Defines the value-level building blocks the entity engine is made of:
//! - [`FieldType`] / [`StoredValue`]: typed values with validation and normalization
//! - [`Field`]: one stored value, identified in memory by a [`FieldKey`](vellum_types::FieldKey)
//! - [`FieldCollection`]: an ordered, cardinality-bounded set of fields with removal tracking
//! - [`Content`] / [`Revision`]: the persisted identity records
//! - [`EntitySchema`] / [`FieldDefinition`]: schema value objects
//! - [`TypeRegistry`]: machine name to field type table, built from [`RegistryConfig`]

mod collection;
mod error;
mod field;
mod field_type;
mod record;
mod registry;
mod schema;

pub use collection::{FieldCollection, MAX_POSITION};
pub use error::{FieldError, FieldResult};
pub use field::{Field, FieldRow};
pub use field_type::{DATE_FORMAT, DATETIME_FORMAT, FieldType, StoredValue};
pub use record::{Content, Revision};
pub use registry::{RegistryConfig, TypeRegistry};
pub use schema::{EntitySchema, FieldDefinition};
