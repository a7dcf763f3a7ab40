//! Error types for field values and collections.

use thiserror::Error;

use crate::FieldType;

/// Errors raised while assigning values to fields and collections.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The collection already holds `max` items and a new slot was requested.
    #[error("the maximum number of items ({max}) has been reached on this field")]
    ItemCount { max: usize },

    /// `null` was appended to a collection.
    #[error("cannot append a null value")]
    NullValue,

    /// Positions are stored as signed 64-bit weights.
    #[error("position {position} is out of range (at most {max})", max = crate::MAX_POSITION)]
    PositionOutOfRange { position: usize },

    /// The value does not satisfy the field type's rules.
    #[error("invalid value for a {field_type} field: {reason}")]
    InvalidValue { field_type: FieldType, reason: String },
}

impl FieldError {
    pub(crate) fn invalid(field_type: FieldType, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field_type,
            reason: reason.into(),
        }
    }
}

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;
