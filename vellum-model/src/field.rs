use chrono::{DateTime, Utc};
use serde_json::Value;
use vellum_types::{FieldId, FieldKey, RevisionId};

use crate::{FieldResult, FieldType, StoredValue};

/// One stored scalar value belonging to a revision.
///
/// A field carries a [`FieldKey`] that identifies it in memory. Clones share
/// the key, which lets a collection recognise an instance that was taken out
/// and put back as the same row rather than a deletion plus an insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: FieldKey,
    id: Option<FieldId>,
    name: String,
    weight: usize,
    revision_id: Option<RevisionId>,
    value: StoredValue,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

/// A field row as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub id: FieldId,
    pub name: String,
    pub weight: usize,
    pub revision_id: RevisionId,
    pub value: StoredValue,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Field {
    /// Validates `raw` against `field_type` and wraps it in a new, unsaved field.
    pub fn new(field_type: FieldType, raw: impl Into<Value>) -> FieldResult<Self> {
        let value = field_type.prepare_value(&raw.into())?;
        Ok(Self::from_value(value))
    }

    /// Wraps an already normalized value in a new, unsaved field.
    #[must_use]
    pub fn from_value(value: StoredValue) -> Self {
        Self {
            key: FieldKey::new(),
            id: None,
            name: String::new(),
            weight: 0,
            revision_id: None,
            value,
            created_at: None,
            updated_at: None,
        }
    }

    /// Rebuilds a persisted field from its stored row.
    #[must_use]
    pub fn from_row(row: FieldRow) -> Self {
        Self {
            key: FieldKey::new(),
            id: Some(row.id),
            name: row.name,
            weight: row.weight,
            revision_id: Some(row.revision_id),
            value: row.value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    #[must_use]
    pub fn key(&self) -> FieldKey {
        self.key
    }

    /// The row id, `None` until the field has been inserted.
    #[must_use]
    pub fn id(&self) -> Option<FieldId> {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn weight(&self) -> usize {
        self.weight
    }

    #[must_use]
    pub fn revision_id(&self) -> Option<RevisionId> {
        self.revision_id
    }

    #[must_use]
    pub fn value(&self) -> &StoredValue {
        &self.value
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Replaces the value, validating it against this field's type.
    pub fn set_value(&mut self, raw: impl Into<Value>) -> FieldResult<()> {
        self.value = self.field_type().prepare_value(&raw.into())?;
        Ok(())
    }

    /// Places the field under `name` at `weight` in `revision_id`, ready to be written.
    pub fn assign(&mut self, name: &str, weight: usize, revision_id: RevisionId) {
        name.clone_into(&mut self.name);
        self.weight = weight;
        self.revision_id = Some(revision_id);
    }

    /// Records the row id and timestamps handed out by the store.
    pub fn mark_persisted(
        &mut self,
        id: FieldId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) {
        self.id = Some(id);
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
    }

    /// Forgets the stored row so the next save inserts a new one.
    pub fn detach(&mut self) {
        self.id = None;
        self.revision_id = None;
        self.created_at = None;
        self.updated_at = None;
    }

    /// Converts the value to its external representation.
    #[must_use]
    pub fn to_export_value(&self) -> Value {
        self.value.to_export_value()
    }
}
