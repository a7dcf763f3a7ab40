//! Machine name → field type table.
//!
//! The registry is an explicit value handed to the entity engine; there is no
//! process-wide table. [`RegistryConfig`] is its serializable form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::FieldType;

/// Serializable registry configuration.
///
/// ```json
/// { "field_types": { "string": "string", "int": "integer", "number": "double" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub field_types: BTreeMap<String, FieldType>,
}

impl RegistryConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for RegistryConfig {
    /// Every type under its machine name, plus the `int`, `number` and `bool` aliases.
    fn default() -> Self {
        let mut field_types: BTreeMap<String, FieldType> = FieldType::ALL
            .iter()
            .map(|t| (t.machine_name().to_string(), *t))
            .collect();
        field_types.insert("int".into(), FieldType::Integer);
        field_types.insert("number".into(), FieldType::Double);
        field_types.insert("bool".into(), FieldType::Boolean);
        Self { field_types }
    }
}

/// Resolves declared type names to [`FieldType`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    types: BTreeMap<String, FieldType>,
}

impl TypeRegistry {
    /// A registry that knows no types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            types: config.field_types.clone(),
        }
    }

    /// Registers (or overrides) `name`.
    pub fn register(&mut self, name: impl Into<String>, field_type: FieldType) {
        self.types.insert(name.into(), field_type);
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<FieldType> {
        self.types.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::from_config(&RegistryConfig::default())
    }
}
