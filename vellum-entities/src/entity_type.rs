//! Compiled entity types.
//!
//! An [`EntityType`] is an [`EntitySchema`] resolved against a
//! [`TypeRegistry`]: every declared field has a concrete [`FieldType`], and
//! every name an entity answers to maps to exactly one [`Attribute`].

use std::collections::HashMap;

use tracing::debug;
use vellum_model::{EntitySchema, FieldType, TypeRegistry};

use crate::{EntityError, EntityResult};

/// Names owned by the content record.
pub const CONTENT_ATTRIBUTES: [&str; 4] = ["id", "created_at", "type", "published"];

/// Names owned by the revision record. `published` is shared and routes to the content.
pub const REVISION_ATTRIBUTES: [&str; 3] = ["language_id", "updated_at", "published"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentAttribute {
    Id,
    CreatedAt,
    Type,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionAttribute {
    LanguageId,
    UpdatedAt,
}

/// What a name resolves to on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Content(ContentAttribute),
    Revision(RevisionAttribute),
    /// Index into the entity's field collections.
    Field(usize),
}

/// One declared field with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: String,
    pub field_type: FieldType,
    /// 0 for unbounded.
    pub max_items: usize,
}

/// A schema compiled into a name → attribute table.
#[derive(Debug, Clone)]
pub struct EntityType {
    name: String,
    fields: Vec<FieldSlot>,
    attributes: HashMap<String, Attribute>,
}

impl EntityType {
    /// Compiles `schema`, resolving each declared type name through `registry`.
    ///
    /// Fails on a field named after a content or revision attribute, on a
    /// type name the registry does not know, and on a name declared twice.
    pub fn new(schema: &EntitySchema, registry: &TypeRegistry) -> EntityResult<Self> {
        let mut attributes: HashMap<String, Attribute> = [
            ("id", ContentAttribute::Id),
            ("created_at", ContentAttribute::CreatedAt),
            ("type", ContentAttribute::Type),
            ("published", ContentAttribute::Published),
        ]
        .into_iter()
        .map(|(name, attr)| (name.to_string(), Attribute::Content(attr)))
        .collect();
        attributes.insert(
            "language_id".into(),
            Attribute::Revision(RevisionAttribute::LanguageId),
        );
        attributes.insert(
            "updated_at".into(),
            Attribute::Revision(RevisionAttribute::UpdatedAt),
        );

        let mut fields = Vec::with_capacity(schema.fields.len());
        for definition in &schema.fields {
            let name = definition.name.as_str();
            if is_reserved(name) {
                return Err(EntityError::ReservedFieldName {
                    entity_type: schema.entity_type.clone(),
                    field: name.to_string(),
                });
            }
            let Some(field_type) = registry.resolve(&definition.type_name) else {
                return Err(EntityError::InvalidFieldType {
                    entity_type: schema.entity_type.clone(),
                    field: name.to_string(),
                    type_name: definition.type_name.clone(),
                });
            };
            if attributes
                .insert(name.to_string(), Attribute::Field(fields.len()))
                .is_some()
            {
                return Err(EntityError::DuplicateFieldName {
                    entity_type: schema.entity_type.clone(),
                    field: name.to_string(),
                });
            }
            fields.push(FieldSlot {
                name: name.to_string(),
                field_type,
                max_items: definition.max_items,
            });
        }

        debug!(
            entity_type = %schema.entity_type,
            fields = fields.len(),
            "compiled entity type"
        );
        Ok(Self {
            name: schema.entity_type.clone(),
            fields,
            attributes,
        })
    }

    /// The content type discriminator, e.g. `comment_demo`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.get(name).copied()
    }

    /// Index of the declared field called `name`.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        match self.attribute(name)? {
            Attribute::Field(index) => Some(index),
            _ => None,
        }
    }

    /// Distinct field types used by the schema, in first-declared order.
    #[must_use]
    pub fn field_types(&self) -> Vec<FieldType> {
        let mut types: Vec<FieldType> = Vec::new();
        for slot in &self.fields {
            if !types.contains(&slot.field_type) {
                types.push(slot.field_type);
            }
        }
        types
    }
}

fn is_reserved(name: &str) -> bool {
    CONTENT_ATTRIBUTES.contains(&name) || REVISION_ATTRIBUTES.contains(&name)
}
