use serde::{Deserialize, Serialize};

/// Describes an entity type: its content type discriminator and its fields.
///
/// Field order is significant: it is the order in which fields are written
/// during a save and listed in an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    pub fields: Vec<FieldDefinition>,
}

/// One declared field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Machine name resolved through a `TypeRegistry` (e.g. `"string"`, `"int"`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Maximum number of values; 0 for unbounded.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_max_items() -> usize {
    1
}

impl EntitySchema {
    /// Creates a schema with no fields. `entity_type` is normalized to snake_case,
    /// so `"CommentDemo"` becomes `"comment_demo"`.
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: snake_case(entity_type),
            fields: Vec::new(),
        }
    }

    /// Adds a field definition.
    #[must_use]
    pub fn field(mut self, definition: FieldDefinition) -> Self {
        self.fields.push(definition);
        self
    }

    /// Parses a schema from its JSON form, normalizing `entity_type` the way
    /// [`EntitySchema::new`] does.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut schema: Self = serde_json::from_str(json)?;
        schema.entity_type = snake_case(&schema.entity_type);
        Ok(schema)
    }

    /// Looks up a field definition by name.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldDefinition {
    /// A single-valued field of the given machine type name.
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            max_items: 1,
        }
    }

    /// Sets the maximum number of values (0 for unbounded).
    #[must_use]
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Shorthand for a string field (at most 255 characters per value).
    pub fn string(name: &str) -> Self {
        Self::new(name, "string")
    }

    /// Shorthand for an unbounded text field.
    pub fn text(name: &str) -> Self {
        Self::new(name, "text")
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, "integer")
    }

    pub fn double(name: &str) -> Self {
        Self::new(name, "double")
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, "boolean")
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, "date")
    }

    pub fn datetime(name: &str) -> Self {
        Self::new(name, "datetime")
    }

    /// Shorthand for a reference to another entity.
    pub fn entity(name: &str) -> Self {
        Self::new(name, "entity")
    }
}

/// `"CommentDemo"` → `"comment_demo"`; already snake-cased names pass through.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else if c == ' ' || c == '-' {
            out.push('_');
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
