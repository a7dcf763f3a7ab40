//! Ordered, cardinality-bounded field storage for one named field.
//!
//! A [`FieldCollection`] maps positions to [`Field`] instances and remembers
//! every instance that left it since the last [`sync_original`]. That memory is
//! what lets a save delete exactly the rows that were dropped.
//!
//! [`sync_original`]: FieldCollection::sync_original

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use vellum_types::FieldKey;

use crate::{Field, FieldError, FieldResult, FieldType, StoredValue};

/// Highest position a collection accepts, the largest weight a store can hold.
pub const MAX_POSITION: usize = i64::MAX as usize;

#[derive(Debug, Clone)]
pub struct FieldCollection {
    field_type: FieldType,
    /// 0 means unbounded.
    max_items: usize,
    items: BTreeMap<usize, Field>,
    removed: Vec<Field>,
}

impl FieldCollection {
    /// Creates an empty collection of `field_type` holding at most `max_items`
    /// values (0 for no limit).
    #[must_use]
    pub fn new(field_type: FieldType, max_items: usize) -> Self {
        Self {
            field_type,
            max_items,
            items: BTreeMap::new(),
            removed: Vec::new(),
        }
    }

    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// `true` when the collection holds at most one value and exports a scalar.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.max_items == 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.items.contains_key(&position)
    }

    /// Sets the value at `position`. `null` removes whatever is there.
    pub fn set(&mut self, position: usize, value: impl Into<Value>) -> FieldResult<()> {
        let value = value.into();
        self.check_capacity(Some(position))?;
        if value.is_null() {
            self.remove(position);
            return Ok(());
        }
        let field = Field::new(self.field_type, value)?;
        self.place(position, field);
        Ok(())
    }

    /// Appends a value after the last occupied position.
    pub fn push(&mut self, value: impl Into<Value>) -> FieldResult<()> {
        let value = value.into();
        self.check_capacity(None)?;
        if value.is_null() {
            return Err(FieldError::NullValue);
        }
        let position = self.next_position()?;
        let field = Field::new(self.field_type, value)?;
        self.items.insert(position, field);
        Ok(())
    }

    /// Puts an existing field instance at `position`.
    pub fn set_field(&mut self, position: usize, field: Field) -> FieldResult<()> {
        self.check_capacity(Some(position))?;
        self.check_type(&field)?;
        self.place(position, field);
        Ok(())
    }

    /// Appends an existing field instance after the last occupied position.
    pub fn push_field(&mut self, field: Field) -> FieldResult<()> {
        self.check_capacity(None)?;
        self.check_type(&field)?;
        let position = self.next_position()?;
        self.items.insert(position, field);
        Ok(())
    }

    /// Returns the value at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&StoredValue> {
        self.items.get(&position).map(Field::value)
    }

    /// Returns the field instance at `position`.
    #[must_use]
    pub fn field(&self, position: usize) -> Option<&Field> {
        self.items.get(&position)
    }

    /// Returns the first value, which is the only one of a single-valued field.
    #[must_use]
    pub fn first(&self) -> Option<&StoredValue> {
        self.items.values().next().map(Field::value)
    }

    /// Removes the instance at `position` and hands it back.
    ///
    /// The instance is recorded as removed; putting it (or a clone) back
    /// cancels that record.
    pub fn take(&mut self, position: usize) -> Option<Field> {
        let field = self.items.remove(&position)?;
        self.removed.push(field.clone());
        Some(field)
    }

    /// Removes the instance at `position`, if any.
    pub fn remove(&mut self, position: usize) {
        self.take(position);
    }

    /// Removes every instance.
    pub fn clear(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.removed.extend(items.into_values());
    }

    /// Instances removed since the last sync that are not present any more.
    #[must_use]
    pub fn deleted(&self) -> Vec<&Field> {
        let present: HashSet<FieldKey> = self.items.values().map(Field::key).collect();
        let mut seen = HashSet::new();
        self.removed
            .iter()
            .filter(|field| !present.contains(&field.key()) && seen.insert(field.key()))
            .collect()
    }

    /// Forgets removal history. Called once a save has committed.
    pub fn sync_original(&mut self) {
        self.removed.clear();
    }

    /// Iterates `(position, field)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.items.iter().map(|(position, field)| (*position, field))
    }

    /// Iterates `(position, field)` pairs mutably, in position order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Field)> {
        self.items.iter_mut().map(|(position, field)| (*position, field))
    }

    /// Iterates values in position order.
    pub fn values(&self) -> impl Iterator<Item = &StoredValue> {
        self.items.values().map(Field::value)
    }

    /// Exports the collection: a scalar (or `null`) for single-valued fields,
    /// an ordered list otherwise.
    #[must_use]
    pub fn export(&self) -> Value {
        if self.is_single() {
            return self.first().map_or(Value::Null, StoredValue::to_export_value);
        }
        Value::Array(self.values().map(StoredValue::to_export_value).collect())
    }

    /// Places a stored row at `weight` without validation or removal tracking.
    pub fn hydrate(&mut self, weight: usize, field: Field) {
        self.items.insert(weight, field);
    }

    /// Detaches every instance from its stored row.
    pub fn detach_all(&mut self) {
        for field in self.items.values_mut() {
            field.detach();
        }
    }

    fn check_capacity(&self, position: Option<usize>) -> FieldResult<()> {
        if let Some(position) = position.filter(|p| *p > MAX_POSITION) {
            return Err(FieldError::PositionOutOfRange { position });
        }
        let new_slot = position.is_none_or(|p| !self.items.contains_key(&p));
        if new_slot && self.max_items != 0 && self.items.len() >= self.max_items {
            return Err(FieldError::ItemCount {
                max: self.max_items,
            });
        }
        Ok(())
    }

    fn check_type(&self, field: &Field) -> FieldResult<()> {
        if field.field_type() != self.field_type {
            return Err(FieldError::invalid(
                self.field_type,
                format!("cannot hold a {} field", field.field_type()),
            ));
        }
        Ok(())
    }

    fn place(&mut self, position: usize, field: Field) {
        if let Some(previous) = self.items.insert(position, field) {
            self.removed.push(previous);
        }
    }

    fn next_position(&self) -> FieldResult<usize> {
        match self.items.keys().next_back() {
            None => Ok(0),
            Some(&last) if last < MAX_POSITION => Ok(last + 1),
            Some(&last) => Err(FieldError::PositionOutOfRange {
                position: last.saturating_add(1),
            }),
        }
    }
}
