//! The in-memory entity: one content, one revision and its field collections.

use std::sync::Arc;

use serde_json::{Map, Value};
use vellum_model::{Content, EntitySchema, FieldCollection, FieldType, Revision, TypeRegistry};
use vellum_types::{ContentId, LanguageId, RevisionId};

use crate::{
    Attribute, ContentAttribute, EntityError, EntityResult, EntityType, RevisionAttribute,
};

/// A piece of content as seen through one revision.
///
/// Reads and writes by name route to the content record, the revision record
/// or a field collection according to the compiled [`EntityType`].
#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) entity_type: Arc<EntityType>,
    pub(crate) content: Content,
    pub(crate) revision: Revision,
    pub(crate) data: Vec<FieldCollection>,
}

impl Entity {
    /// Creates an unsaved entity in `language_id`.
    pub fn new(entity_type: Arc<EntityType>, language_id: i64) -> EntityResult<Self> {
        let language_id =
            LanguageId::new(language_id).map_err(|_| EntityError::InvalidLanguage(language_id))?;
        let data = entity_type
            .fields()
            .iter()
            .map(|slot| FieldCollection::new(slot.field_type, slot.max_items))
            .collect();
        Ok(Self {
            content: Content::new(entity_type.name()),
            revision: Revision::new(language_id),
            data,
            entity_type,
        })
    }

    /// Compiles `schema` and creates an unsaved entity of it.
    ///
    /// The language is checked before the schema.
    pub fn from_schema(
        schema: &EntitySchema,
        registry: &TypeRegistry,
        language_id: i64,
    ) -> EntityResult<Self> {
        if language_id <= 0 {
            return Err(EntityError::InvalidLanguage(language_id));
        }
        let entity_type = EntityType::new(schema, registry)?;
        Self::new(Arc::new(entity_type), language_id)
    }

    // ── Accessors ────────────────────────────────────────────────

    #[must_use]
    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Content id, once saved.
    #[must_use]
    pub fn id(&self) -> Option<ContentId> {
        self.content.id
    }

    #[must_use]
    pub fn revision_id(&self) -> Option<RevisionId> {
        self.revision.id
    }

    #[must_use]
    pub fn language_id(&self) -> LanguageId {
        self.revision.language_id
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content.content_type
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.content.published
    }

    #[must_use]
    pub fn is_revision_published(&self) -> bool {
        self.revision.published
    }

    /// Whether a row backs both the content and the revision.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.content.is_persisted() && self.revision.is_persisted()
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.entity_type.field_index(name).is_some()
    }

    /// The collection behind a declared field.
    pub fn field(&self, name: &str) -> EntityResult<&FieldCollection> {
        let index = self.field_index(name)?;
        Ok(&self.data[index])
    }

    /// Mutable access to the collection behind a declared field.
    pub fn field_mut(&mut self, name: &str) -> EntityResult<&mut FieldCollection> {
        let index = self.field_index(name)?;
        Ok(&mut self.data[index])
    }

    // ── Attribute access ─────────────────────────────────────────

    /// Reads an attribute by name.
    ///
    /// Fields export as a scalar (or `null`) when single-valued and as a list
    /// otherwise; record attributes export as their JSON form.
    pub fn get(&self, name: &str) -> EntityResult<Value> {
        let value = match self.resolve(name)? {
            Attribute::Content(ContentAttribute::Id) => {
                self.content.id.map_or(Value::Null, |id| Value::from(id.get()))
            }
            Attribute::Content(ContentAttribute::CreatedAt) => {
                serde_json::to_value(self.content.created_at)?
            }
            Attribute::Content(ContentAttribute::Type) => {
                Value::String(self.content.content_type.clone())
            }
            Attribute::Content(ContentAttribute::Published) => Value::Bool(self.content.published),
            Attribute::Revision(RevisionAttribute::LanguageId) => {
                Value::from(self.revision.language_id.get())
            }
            Attribute::Revision(RevisionAttribute::UpdatedAt) => {
                serde_json::to_value(self.revision.updated_at)?
            }
            Attribute::Field(index) => self.data[index].export(),
        };
        Ok(value)
    }

    /// Writes an attribute by name.
    ///
    /// A list replaces the whole collection, element `i` going to position
    /// `i`. A scalar sets position 0 and is only accepted by single-valued
    /// fields. A failed write leaves the entity untouched.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> EntityResult<()> {
        let value = value.into();
        match self.resolve(name)? {
            Attribute::Content(attribute) => self.set_content_attribute(name, attribute, value),
            Attribute::Revision(attribute) => self.set_revision_attribute(name, attribute, value),
            Attribute::Field(index) => self.set_field_value(index, value),
        }
    }

    // ── Derived entities ─────────────────────────────────────────

    /// A sibling entity sharing this content with a fresh, empty revision.
    ///
    /// `language_id` defaults to the current revision's language.
    pub fn new_revision(&self, language_id: Option<i64>) -> EntityResult<Self> {
        let language_id = language_id.unwrap_or_else(|| self.revision.language_id.get());
        let mut sibling = Self::new(self.entity_type.clone(), language_id)?;
        sibling.content = self.content.clone();
        Ok(sibling)
    }

    /// The value to store in an `entity` field to point at this entity.
    pub fn reference(&self) -> EntityResult<Value> {
        match self.content.id {
            Some(id) if self.content.is_persisted() => Ok(Value::from(id.get())),
            _ => Err(EntityError::NotPersisted),
        }
    }

    /// Snapshot of the entity: `content`, `revision` and one entry per
    /// declared field. A field named `content` or `revision` is shadowed by
    /// the record.
    pub fn export(&self) -> EntityResult<Value> {
        let mut out = Map::new();
        for (slot, collection) in self.entity_type.fields().iter().zip(&self.data) {
            out.insert(slot.name.clone(), collection.export());
        }
        out.insert("content".into(), serde_json::to_value(&self.content)?);
        out.insert("revision".into(), serde_json::to_value(&self.revision)?);
        Ok(Value::Object(out))
    }

    // ── Internals ────────────────────────────────────────────────

    fn resolve(&self, name: &str) -> EntityResult<Attribute> {
        self.entity_type
            .attribute(name)
            .ok_or_else(|| self.non_existent(name))
    }

    fn field_index(&self, name: &str) -> EntityResult<usize> {
        self.entity_type
            .field_index(name)
            .ok_or_else(|| self.non_existent(name))
    }

    fn non_existent(&self, name: &str) -> EntityError {
        EntityError::NonExistentField {
            entity_type: self.entity_type.name().to_string(),
            field: name.to_string(),
        }
    }

    fn set_field_value(&mut self, index: usize, value: Value) -> EntityResult<()> {
        let current = &self.data[index];
        let mut next = current.clone();
        match value {
            Value::Array(items) => {
                next.clear();
                for (position, item) in items.into_iter().enumerate() {
                    next.set(position, item)?;
                }
            }
            scalar => {
                if !current.is_single() {
                    let name = &self.entity_type.fields()[index].name;
                    return Err(EntityError::MultipleFieldAssignment(name.clone()));
                }
                next.set(0, scalar)?;
            }
        }
        self.data[index] = next;
        Ok(())
    }

    fn set_content_attribute(
        &mut self,
        name: &str,
        attribute: ContentAttribute,
        value: Value,
    ) -> EntityResult<()> {
        match attribute {
            ContentAttribute::Type => match value {
                Value::String(content_type) if !content_type.is_empty() => {
                    self.content.content_type = content_type;
                    Ok(())
                }
                _ => Err(invalid_attribute(name, "expected a non-empty string")),
            },
            ContentAttribute::Published => {
                self.content.published = parse_flag(name, &value)?;
                Ok(())
            }
            ContentAttribute::Id | ContentAttribute::CreatedAt => {
                Err(invalid_attribute(name, "the attribute is read-only"))
            }
        }
    }

    fn set_revision_attribute(
        &mut self,
        name: &str,
        attribute: RevisionAttribute,
        value: Value,
    ) -> EntityResult<()> {
        match attribute {
            RevisionAttribute::LanguageId => {
                let raw = value
                    .as_i64()
                    .ok_or_else(|| invalid_attribute(name, "expected an integer"))?;
                self.revision.language_id =
                    LanguageId::new(raw).map_err(|_| EntityError::InvalidLanguage(raw))?;
                Ok(())
            }
            RevisionAttribute::UpdatedAt => {
                Err(invalid_attribute(name, "the attribute is read-only"))
            }
        }
    }
}

fn parse_flag(name: &str, value: &Value) -> EntityResult<bool> {
    FieldType::Boolean
        .prepare_value(value)
        .ok()
        .and_then(|stored| stored.as_bool())
        .ok_or_else(|| invalid_attribute(name, "expected a boolean"))
}

fn invalid_attribute(name: &str, reason: &str) -> EntityError {
    EntityError::InvalidAttributeValue {
        attribute: name.to_string(),
        reason: reason.to_string(),
    }
}
