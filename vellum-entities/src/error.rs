//! Error types for the entity engine.

use thiserror::Error;
use vellum_model::FieldError;
use vellum_storage::StorageError;
use vellum_types::{ContentId, LanguageId, RevisionId};

/// Entity-level errors.
#[derive(Debug, Error)]
pub enum EntityError {
    // ── Construction ─────────────────────────────────────────────
    /// Language ids must be strictly positive.
    #[error("you must set a valid language id, got {0}")]
    InvalidLanguage(i64),

    #[error("the field '{field}' cannot be used in '{entity_type}' as it is a reserved name")]
    ReservedFieldName { entity_type: String, field: String },

    #[error("the field '{field}' is declared twice in '{entity_type}'")]
    DuplicateFieldName { entity_type: String, field: String },

    #[error("unknown type '{type_name}' for field '{field}' in '{entity_type}'")]
    InvalidFieldType {
        entity_type: String,
        field: String,
        type_name: String,
    },

    // ── Lookup ───────────────────────────────────────────────────
    #[error("the entity with id '{0}' doesn't exist")]
    EntityNotFound(ContentId),

    #[error("the revision '{0}' doesn't exist")]
    RevisionNotFound(RevisionId),

    #[error("revision '{revision}' doesn't belong to entity '{content}'")]
    RevisionEntityMismatch {
        revision: RevisionId,
        content: ContentId,
    },

    #[error("there are no revisions in language '{language}' for entity '{content}'")]
    NoRevisionForLanguage {
        content: ContentId,
        language: LanguageId,
    },

    #[error(
        "there are revisions in language '{language}' for entity '{content}' but none is published"
    )]
    NoPublishedRevisionForLanguage {
        content: ContentId,
        language: LanguageId,
    },

    // ── Mutation ─────────────────────────────────────────────────
    #[error("field '{field}' doesn't exist in '{entity_type}'")]
    NonExistentField { entity_type: String, field: String },

    #[error("cannot assign a single value to the multiple-valued field '{0}'")]
    MultipleFieldAssignment(String),

    /// Invalid write to a content or revision attribute.
    #[error("cannot set '{attribute}': {reason}")]
    InvalidAttributeValue { attribute: String, reason: String },

    /// The operation needs a persisted entity.
    #[error("the entity has not been saved")]
    NotPersisted,

    /// An `entity` field points at content that isn't stored.
    #[error("field '{field}' references entity '{content}', which doesn't exist")]
    DanglingReference { field: String, content: ContentId },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;
