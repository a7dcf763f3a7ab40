//! Core type definitions for vellum.
//!
//! This crate defines the identifiers shared by every layer of the store:
//! - Row identifiers assigned by the database (`ContentId`, `RevisionId`, `FieldId`)
//! - Language identifiers (`LanguageId`, always positive)
//! - In-memory field identity keys (`FieldKey`, UUID v7)

mod ids;

pub use ids::{ContentId, FieldId, FieldKey, LanguageId, RevisionId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building identifiers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid language id {0}: language ids must be positive")]
    InvalidLanguage(i64),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
