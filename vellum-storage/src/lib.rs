//! Persistence layer for vellum.
//!
//! The entity engine talks to storage through two traits:
//!
//! - [`Store`] runs a closure as one atomic unit of work ([`Store::transaction`])
//!   or against the current state without a transaction ([`Store::read`]).
//! - [`Repository`] is what the closure receives: typed row operations on
//!   contents, revisions and the per-type field tables.
//!
//! [`SqliteStore`] is the bundled implementation. Row ids come from
//! `AUTOINCREMENT` keys, so they increase monotonically and are never reused.

mod error;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vellum_model::{Content, Field, FieldRow, FieldType, Revision};
use vellum_types::{ContentId, FieldId, LanguageId, RevisionId};

/// Where a store keeps its data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. `None` keeps everything in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Transactional access to a repository.
pub trait Store {
    /// Runs `f` inside one transaction. The transaction commits when `f`
    /// returns `Ok` and rolls back otherwise.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn Repository) -> Result<T, E>,
        E: From<StorageError>;

    /// Runs `f` against the current state, outside any explicit transaction.
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn Repository) -> Result<T, E>,
        E: From<StorageError>;
}

/// Typed row operations.
pub trait Repository {
    // ── Contents ─────────────────────────────────────────────────

    /// Inserts `content`, assigning its id and timestamps.
    fn insert_content(&self, content: &mut Content) -> StorageResult<()>;

    /// Writes `content` over its existing row and refreshes `updated_at`.
    fn update_content(&self, content: &mut Content) -> StorageResult<()>;

    fn delete_content(&self, id: ContentId) -> StorageResult<()>;

    fn find_content(&self, id: ContentId) -> StorageResult<Option<Content>>;

    // ── Revisions ────────────────────────────────────────────────

    /// Inserts `revision`, assigning its id and timestamps. `content_id` must be set.
    fn insert_revision(&self, revision: &mut Revision) -> StorageResult<()>;

    fn update_revision(&self, revision: &mut Revision) -> StorageResult<()>;

    /// Deletes the given revisions, returning how many rows went away.
    fn delete_revisions(&self, ids: &[RevisionId]) -> StorageResult<usize>;

    fn find_revision(&self, id: RevisionId) -> StorageResult<Option<Revision>>;

    /// All revisions of a content, oldest first.
    fn revisions_for_content(&self, content_id: ContentId) -> StorageResult<Vec<Revision>>;

    /// The published revision of a content in a language, if any.
    fn find_published_revision(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
    ) -> StorageResult<Option<Revision>>;

    /// Number of revisions of a content in a language, published or not.
    fn count_revisions(&self, content_id: ContentId, language_id: LanguageId)
    -> StorageResult<usize>;

    /// Unpublishes every revision of `(content_id, language_id)` except `except`.
    fn unpublish_other_revisions(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
        except: RevisionId,
    ) -> StorageResult<usize>;

    /// Publishes the most recently created revision of `(content_id, language_id)`
    /// other than `except`, returning its id.
    fn republish_latest_revision(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
        except: RevisionId,
    ) -> StorageResult<Option<RevisionId>>;

    // ── Fields ───────────────────────────────────────────────────

    /// Inserts `field` into its type's table. Name, weight and revision must be assigned.
    fn insert_field(&self, field: &mut Field) -> StorageResult<()>;

    fn update_field(&self, field: &mut Field) -> StorageResult<()>;

    fn delete_field(&self, field_type: FieldType, id: FieldId) -> StorageResult<()>;

    /// Every row of `field_type` stored under `revision_id`, ordered by name then weight.
    fn fields_for_revision(
        &self,
        field_type: FieldType,
        revision_id: RevisionId,
    ) -> StorageResult<Vec<FieldRow>>;

    /// Deletes every row of `field_type` stored under any of `revision_ids`.
    fn delete_fields_for_revisions(
        &self,
        field_type: FieldType,
        revision_ids: &[RevisionId],
    ) -> StorageResult<usize>;

    // ── Upserts ──────────────────────────────────────────────────

    /// Inserts or updates `content`. Returns `true` when a row was created.
    fn save_content(&self, content: &mut Content) -> StorageResult<bool> {
        if content.is_persisted() {
            self.update_content(content)?;
            Ok(false)
        } else {
            self.insert_content(content)?;
            Ok(true)
        }
    }

    /// Inserts or updates `revision`. Returns `true` when a row was created.
    fn save_revision(&self, revision: &mut Revision) -> StorageResult<bool> {
        if revision.is_persisted() {
            self.update_revision(revision)?;
            Ok(false)
        } else {
            self.insert_revision(revision)?;
            Ok(true)
        }
    }

    /// Inserts `field` when it has no row yet, updates it otherwise.
    fn save_field(&self, field: &mut Field) -> StorageResult<bool> {
        if field.id().is_some() {
            self.update_field(field)?;
            Ok(false)
        } else {
            self.insert_field(field)?;
            Ok(true)
        }
    }
}
