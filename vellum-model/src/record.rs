//! Persisted identity records: one [`Content`] per logical item, one
//! [`Revision`] per language-specific version of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vellum_types::{ContentId, LanguageId, RevisionId};

/// Stable identity of one logical piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: Option<ContentId>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    persisted: bool,
}

impl Content {
    /// A fresh, unsaved content of `content_type`. Published by default.
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            id: None,
            content_type: content_type.into(),
            published: true,
            created_at: None,
            updated_at: None,
            persisted: false,
        }
    }

    /// Rebuilds a content read from storage.
    #[must_use]
    pub fn restored(
        id: ContentId,
        content_type: String,
        published: bool,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            content_type,
            published,
            created_at,
            updated_at,
            persisted: true,
        }
    }

    /// Whether a row currently backs this record.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn mark_persisted(&mut self, id: ContentId) {
        self.id = Some(id);
        self.persisted = true;
    }

    /// The row is gone; the id is kept for inspection.
    pub fn mark_deleted(&mut self) {
        self.persisted = false;
    }

    /// Drops the id and timestamps, leaving a fresh unsaved record.
    pub fn forget(&mut self) {
        self.id = None;
        self.created_at = None;
        self.updated_at = None;
        self.persisted = false;
    }
}

/// One language-specific version of a [`Content`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: Option<RevisionId>,
    pub content_id: Option<ContentId>,
    pub language_id: LanguageId,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    persisted: bool,
}

impl Revision {
    /// A fresh, unsaved revision in `language_id`. Published by default.
    #[must_use]
    pub fn new(language_id: LanguageId) -> Self {
        Self {
            id: None,
            content_id: None,
            language_id,
            published: true,
            created_at: None,
            updated_at: None,
            persisted: false,
        }
    }

    /// Rebuilds a revision read from storage.
    #[must_use]
    pub fn restored(
        id: RevisionId,
        content_id: ContentId,
        language_id: LanguageId,
        published: bool,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            content_id: Some(content_id),
            language_id,
            published,
            created_at,
            updated_at,
            persisted: true,
        }
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn mark_persisted(&mut self, id: RevisionId) {
        self.id = Some(id);
        self.persisted = true;
    }

    pub fn mark_deleted(&mut self) {
        self.persisted = false;
    }

    pub fn forget(&mut self) {
        self.id = None;
        self.content_id = None;
        self.created_at = None;
        self.updated_at = None;
        self.persisted = false;
    }
}
