//! Store operations on [`Entity`]: save, find, delete and publishing.
//!
//! Every mutating operation runs as one [`Store::transaction`]. Saves work on a
//! copy of the entity that replaces the original only after the commit, so a
//! failed save leaves the in-memory entity exactly as it was.

use std::sync::Arc;

use tracing::{debug, info};
use vellum_model::{Field, FieldType, Revision};
use vellum_storage::{Repository, StorageError, Store};
use vellum_types::{ContentId, LanguageId, RevisionId};

use crate::{Entity, EntityError, EntityResult, EntityType};

/// How [`Entity::save`] treats the revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write a brand-new revision instead of updating the current one.
    pub new_revision: bool,
    /// Make the saved revision the published one for its language.
    pub publish: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            new_revision: false,
            publish: true,
        }
    }
}

impl SaveOptions {
    #[must_use]
    pub fn new_revision(mut self, new_revision: bool) -> Self {
        self.new_revision = new_revision;
        self
    }

    #[must_use]
    pub fn publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }
}

impl Entity {
    /// Persists content, revision and fields in one transaction.
    ///
    /// With `new_revision`, every field is written as a new row under a new
    /// revision and the previous revision's rows are left alone. Otherwise
    /// rows removed since the last save are deleted first. With `publish`,
    /// every other revision of the same content and language is unpublished.
    /// An `entity` field pointing at content that isn't stored fails the save.
    pub fn save<S: Store>(&mut self, store: &S, options: SaveOptions) -> EntityResult<()> {
        let mut working = self.clone();
        store.transaction(|repo| working.persist(repo, options))?;
        *self = working;
        info!(
            content_id = ?self.content.id,
            revision_id = ?self.revision.id,
            language_id = %self.revision.language_id,
            new_revision = options.new_revision,
            publish = options.publish,
            "saved entity"
        );
        Ok(())
    }

    /// Loads an entity in `language_id`.
    ///
    /// Without `revision_id` the published revision of that language is used.
    /// Stored rows whose name or type the schema no longer declares are skipped.
    pub fn find<S: Store>(
        store: &S,
        entity_type: Arc<EntityType>,
        id: ContentId,
        language_id: i64,
        revision_id: Option<RevisionId>,
    ) -> EntityResult<Self> {
        let mut entity = Self::new(entity_type, language_id)?;
        let language = entity.revision.language_id;
        store.read(|repo| entity.load(repo, id, language, revision_id))?;
        debug!(
            content_id = %id,
            revision_id = ?entity.revision.id,
            "loaded entity"
        );
        Ok(entity)
    }

    /// Deletes the content with every revision and field row.
    ///
    /// With `clear`, ids are dropped and every field is emptied. Without it the
    /// field values stay readable and are written as new rows by the next save.
    pub fn delete<S: Store>(&mut self, store: &S, clear: bool) -> EntityResult<()> {
        match self.content.id {
            Some(content_id) if self.content.is_persisted() => {
                let removed = store.transaction(|repo| -> EntityResult<usize> {
                    let revision_ids: Vec<RevisionId> = repo
                        .revisions_for_content(content_id)?
                        .into_iter()
                        .filter_map(|revision| revision.id)
                        .collect();
                    for field_type in FieldType::ALL {
                        repo.delete_fields_for_revisions(field_type, &revision_ids)?;
                    }
                    let removed = repo.delete_revisions(&revision_ids)?;
                    repo.delete_content(content_id)?;
                    Ok(removed)
                })?;
                info!(%content_id, revisions = removed, "deleted entity");
            }
            _ => debug!("entity was never saved, nothing to delete"),
        }

        self.content.mark_deleted();
        self.revision.mark_deleted();
        if clear {
            self.content.forget();
            self.revision.forget();
            self.clear_fields();
        } else {
            self.detach_fields();
        }
        Ok(())
    }

    /// Deletes the current revision and its field rows.
    ///
    /// When the stored revision was published, the most recent remaining
    /// revision of the same language is published in its place. The stored
    /// row decides, not the in-memory flag, which may be stale.
    pub fn delete_revision<S: Store>(&mut self, store: &S, clear: bool) -> EntityResult<()> {
        match self.revision.id {
            Some(revision_id) if self.revision.is_persisted() => {
                let republished = store.transaction(|repo| -> EntityResult<Option<RevisionId>> {
                    let stored = repo.find_revision(revision_id)?;
                    for field_type in FieldType::ALL {
                        repo.delete_fields_for_revisions(field_type, &[revision_id])?;
                    }
                    repo.delete_revisions(&[revision_id])?;
                    let Some(stored) = stored.filter(|revision| revision.published) else {
                        return Ok(None);
                    };
                    let Some(content_id) = stored.content_id else {
                        return Ok(None);
                    };
                    if repo
                        .find_published_revision(content_id, stored.language_id)?
                        .is_some()
                    {
                        return Ok(None);
                    }
                    Ok(repo.republish_latest_revision(
                        content_id,
                        stored.language_id,
                        revision_id,
                    )?)
                })?;
                info!(%revision_id, ?republished, "deleted revision");
            }
            _ => debug!("revision was never saved, nothing to delete"),
        }

        self.revision.mark_deleted();
        if clear {
            self.revision.forget();
            self.clear_fields();
        } else {
            self.detach_fields();
        }
        Ok(())
    }

    /// Makes the current revision the published one for its language.
    ///
    /// An unsaved entity is saved (and published) instead.
    pub fn publish_revision<S: Store>(&mut self, store: &S) -> EntityResult<()> {
        let (Some(content_id), Some(revision_id)) = (self.content.id, self.revision.id) else {
            return self.save(store, SaveOptions::default());
        };
        if !self.is_persisted() {
            return self.save(store, SaveOptions::default());
        }

        let mut revision = self.revision.clone();
        revision.published = true;
        let unpublished = store.transaction(|repo| -> EntityResult<usize> {
            repo.update_revision(&mut revision)?;
            Ok(repo.unpublish_other_revisions(content_id, revision.language_id, revision_id)?)
        })?;
        self.revision = revision;
        info!(%content_id, %revision_id, unpublished, "published revision");
        Ok(())
    }

    /// Every stored revision of this content, oldest first.
    pub fn revisions<S: Store>(&self, store: &S) -> EntityResult<Vec<Revision>> {
        match self.content.id {
            Some(content_id) if self.content.is_persisted() => {
                Ok(store.read(|repo| repo.revisions_for_content(content_id))?)
            }
            _ => Ok(Vec::new()),
        }
    }

    // ── Internals ────────────────────────────────────────────────

    fn persist(&mut self, repo: &dyn Repository, options: SaveOptions) -> EntityResult<()> {
        if options.new_revision {
            self.revision = Revision::new(self.revision.language_id);
        }

        let content_created = repo.save_content(&mut self.content)?;
        let content_id = self
            .content
            .id
            .ok_or(StorageError::NotPersisted("contents"))?;

        if options.publish {
            self.revision.published = true;
        } else if !self.revision.is_persisted() {
            self.revision.published = false;
        }
        self.revision.content_id = Some(content_id);
        repo.save_revision(&mut self.revision)?;
        let revision_id = self
            .revision
            .id
            .ok_or(StorageError::NotPersisted("revisions"))?;

        if options.publish && !content_created {
            repo.unpublish_other_revisions(content_id, self.revision.language_id, revision_id)?;
        }

        for (slot, collection) in self.entity_type.fields().iter().zip(self.data.iter_mut()) {
            if !options.new_revision {
                for field in collection.deleted() {
                    if let Some(id) = field.id() {
                        repo.delete_field(field.field_type(), id)?;
                    }
                }
            }
            for (position, field) in collection.iter_mut() {
                if options.new_revision {
                    field.detach();
                }
                if let Some(target) = field.value().as_content_id()
                    && repo.find_content(target)?.is_none()
                {
                    return Err(EntityError::DanglingReference {
                        field: slot.name.clone(),
                        content: target,
                    });
                }
                field.assign(&slot.name, position, revision_id);
                repo.save_field(field)?;
            }
            collection.sync_original();
        }
        Ok(())
    }

    fn load(
        &mut self,
        repo: &dyn Repository,
        id: ContentId,
        language_id: LanguageId,
        revision_id: Option<RevisionId>,
    ) -> EntityResult<()> {
        self.content = repo
            .find_content(id)?
            .ok_or(EntityError::EntityNotFound(id))?;
        self.revision = resolve_revision(repo, id, language_id, revision_id)?;
        let revision_id = self
            .revision
            .id
            .ok_or(StorageError::NotPersisted("revisions"))?;

        for field_type in self.entity_type.field_types() {
            for row in repo.fields_for_revision(field_type, revision_id)? {
                let index = self
                    .entity_type
                    .field_index(&row.name)
                    .filter(|&index| self.entity_type.fields()[index].field_type == field_type);
                match index {
                    Some(index) => {
                        let weight = row.weight;
                        self.data[index].hydrate(weight, Field::from_row(row));
                    }
                    None => debug!(
                        field = %row.name,
                        %field_type,
                        "skipping stored field not declared by the schema"
                    ),
                }
            }
        }
        Ok(())
    }

    fn clear_fields(&mut self) {
        for collection in &mut self.data {
            collection.clear();
            collection.sync_original();
        }
    }

    fn detach_fields(&mut self) {
        for collection in &mut self.data {
            collection.detach_all();
            collection.sync_original();
        }
    }
}

fn resolve_revision(
    repo: &dyn Repository,
    content_id: ContentId,
    language_id: LanguageId,
    revision_id: Option<RevisionId>,
) -> EntityResult<Revision> {
    if let Some(revision_id) = revision_id {
        let revision = repo
            .find_revision(revision_id)?
            .ok_or(EntityError::RevisionNotFound(revision_id))?;
        if revision.content_id != Some(content_id) {
            return Err(EntityError::RevisionEntityMismatch {
                revision: revision_id,
                content: content_id,
            });
        }
        return Ok(revision);
    }

    if let Some(revision) = repo.find_published_revision(content_id, language_id)? {
        return Ok(revision);
    }
    if repo.count_revisions(content_id, language_id)? > 0 {
        Err(EntityError::NoPublishedRevisionForLanguage {
            content: content_id,
            language: language_id,
        })
    } else {
        Err(EntityError::NoRevisionForLanguage {
            content: content_id,
            language: language_id,
        })
    }
}
