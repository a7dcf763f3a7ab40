//! SQLite-backed [`Store`].
//!
//! One connection guarded by a mutex; every unit of work holds the lock for
//! its whole duration, so units of work issued through the same store never
//! interleave.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::{Type, Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use vellum_model::{
    Content, DATE_FORMAT, DATETIME_FORMAT, Field, FieldRow, FieldType, Revision, StoredValue,
};
use vellum_types::{ContentId, FieldId, LanguageId, RevisionId};

use crate::{Repository, Store, StorageError, StorageResult, StoreConfig};

const CONTENT_COLUMNS: &str = "id, type, published, created_at, updated_at";
const REVISION_COLUMNS: &str = "id, content_id, language_id, published, created_at, updated_at";
const FIELD_COLUMNS: &str = "id, name, weight, revision_id, value, created_at, updated_at";

/// Persistent store for contents, revisions and fields backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens the store described by `config`.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        match &config.path {
            Some(path) => Self::open_path(path),
            None => Self::open_in_memory(),
        }
    }

    /// Opens (or creates) a store at the given path.
    pub fn open_path(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened content store");
        Self::open_with_conn(conn)
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open_with_conn(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, creating the schema if needed.
    pub fn open_with_conn(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS contents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                published INTEGER NOT NULL DEFAULT 1,
                created_at TEXT,
                updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS revisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_id INTEGER NOT NULL REFERENCES contents(id),
                language_id INTEGER NOT NULL,
                published INTEGER NOT NULL DEFAULT 1,
                created_at TEXT,
                updated_at TEXT
            );

            CREATE INDEX IF NOT EXISTS revisions_content_language
                ON revisions (content_id, language_id, published);
            ",
        )?;

        for field_type in FieldType::ALL {
            let table = field_type.table();
            let column = value_column_type(field_type);
            conn.execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    weight INTEGER NOT NULL,
                    revision_id INTEGER NOT NULL REFERENCES revisions(id),
                    value {column} NOT NULL,
                    created_at TEXT,
                    updated_at TEXT
                );

                CREATE INDEX IF NOT EXISTS {table}_revision ON {table} (revision_id, name, weight);
                "
            ))?;
        }
        debug!("content store schema ready");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn Repository) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(StorageError::from)?;
        let result = f(&SqliteRepository { conn: &*tx });
        match result {
            Ok(value) => {
                tx.commit().map_err(StorageError::from)?;
                debug!("unit of work committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                debug!("unit of work rolled back");
                Err(err)
            }
        }
    }

    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn Repository) -> Result<T, E>,
        E: From<StorageError>,
    {
        let conn = self.lock()?;
        f(&SqliteRepository { conn: &*conn })
    }
}

struct SqliteRepository<'c> {
    conn: &'c Connection,
}

impl SqliteRepository<'_> {
    fn revisions_where(
        &self,
        condition: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<Revision>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVISION_COLUMNS} FROM revisions WHERE {condition} ORDER BY id"
        ))?;
        let rows = stmt.query_map(params, revision_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl Repository for SqliteRepository<'_> {
    // ── Contents ─────────────────────────────────────────────────

    fn insert_content(&self, content: &mut Content) -> StorageResult<()> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO contents (type, published, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![content.content_type, content.published, now, now],
        )?;
        content.mark_persisted(ContentId::from_raw(self.conn.last_insert_rowid()));
        content.created_at = Some(now);
        content.updated_at = Some(now);
        Ok(())
    }

    fn update_content(&self, content: &mut Content) -> StorageResult<()> {
        let id = content.id.ok_or(StorageError::NotPersisted("content"))?;
        let now = Utc::now();
        let changed = self.conn.execute(
            "UPDATE contents SET type = ?1, published = ?2, updated_at = ?3 WHERE id = ?4",
            params![content.content_type, content.published, now, id.get()],
        )?;
        if changed == 0 {
            return Err(StorageError::RowNotFound {
                table: "contents",
                id: id.get(),
            });
        }
        content.updated_at = Some(now);
        Ok(())
    }

    fn delete_content(&self, id: ContentId) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM contents WHERE id = ?1", params![id.get()])?;
        Ok(())
    }

    fn find_content(&self, id: ContentId) -> StorageResult<Option<Content>> {
        let content = self
            .conn
            .query_row(
                &format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = ?1"),
                params![id.get()],
                content_from_row,
            )
            .optional()?;
        Ok(content)
    }

    // ── Revisions ────────────────────────────────────────────────

    fn insert_revision(&self, revision: &mut Revision) -> StorageResult<()> {
        let content_id = revision
            .content_id
            .ok_or(StorageError::NotPersisted("revision content"))?;
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO revisions (content_id, language_id, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                content_id.get(),
                revision.language_id.get(),
                revision.published,
                now,
                now
            ],
        )?;
        revision.mark_persisted(RevisionId::from_raw(self.conn.last_insert_rowid()));
        revision.created_at = Some(now);
        revision.updated_at = Some(now);
        Ok(())
    }

    fn update_revision(&self, revision: &mut Revision) -> StorageResult<()> {
        let id = revision.id.ok_or(StorageError::NotPersisted("revision"))?;
        let content_id = revision
            .content_id
            .ok_or(StorageError::NotPersisted("revision content"))?;
        let now = Utc::now();
        let changed = self.conn.execute(
            "UPDATE revisions SET content_id = ?1, language_id = ?2, published = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                content_id.get(),
                revision.language_id.get(),
                revision.published,
                now,
                id.get()
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RowNotFound {
                table: "revisions",
                id: id.get(),
            });
        }
        revision.updated_at = Some(now);
        Ok(())
    }

    fn delete_revisions(&self, ids: &[RevisionId]) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.conn.execute(
            &format!("DELETE FROM revisions WHERE id IN ({})", placeholders(ids.len())),
            params_from_iter(ids.iter().map(RevisionId::get)),
        )?;
        Ok(deleted)
    }

    fn find_revision(&self, id: RevisionId) -> StorageResult<Option<Revision>> {
        let revision = self
            .conn
            .query_row(
                &format!("SELECT {REVISION_COLUMNS} FROM revisions WHERE id = ?1"),
                params![id.get()],
                revision_from_row,
            )
            .optional()?;
        Ok(revision)
    }

    fn revisions_for_content(&self, content_id: ContentId) -> StorageResult<Vec<Revision>> {
        self.revisions_where("content_id = ?1", params![content_id.get()])
    }

    fn find_published_revision(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
    ) -> StorageResult<Option<Revision>> {
        let revision = self
            .conn
            .query_row(
                &format!(
                    "SELECT {REVISION_COLUMNS} FROM revisions
                     WHERE content_id = ?1 AND language_id = ?2 AND published = 1
                     ORDER BY id DESC LIMIT 1"
                ),
                params![content_id.get(), language_id.get()],
                revision_from_row,
            )
            .optional()?;
        Ok(revision)
    }

    fn count_revisions(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
    ) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM revisions WHERE content_id = ?1 AND language_id = ?2",
            params![content_id.get(), language_id.get()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn unpublish_other_revisions(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
        except: RevisionId,
    ) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE revisions SET published = 0, updated_at = ?1
             WHERE content_id = ?2 AND language_id = ?3 AND id != ?4 AND published = 1",
            params![Utc::now(), content_id.get(), language_id.get(), except.get()],
        )?;
        Ok(changed)
    }

    fn republish_latest_revision(
        &self,
        content_id: ContentId,
        language_id: LanguageId,
        except: RevisionId,
    ) -> StorageResult<Option<RevisionId>> {
        let latest: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM revisions
                 WHERE content_id = ?1 AND language_id = ?2 AND id != ?3
                 ORDER BY id DESC LIMIT 1",
                params![content_id.get(), language_id.get(), except.get()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(latest) = latest else {
            return Ok(None);
        };
        self.conn.execute(
            "UPDATE revisions SET published = 1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now(), latest],
        )?;
        Ok(Some(RevisionId::from_raw(latest)))
    }

    // ── Fields ───────────────────────────────────────────────────

    fn insert_field(&self, field: &mut Field) -> StorageResult<()> {
        let revision_id = field
            .revision_id()
            .ok_or(StorageError::NotPersisted("field revision"))?;
        let weight = weight_to_sql(field.weight())?;
        let now = Utc::now();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (name, weight, revision_id, value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                field.field_type().table()
            ),
            params![
                field.name(),
                weight,
                revision_id.get(),
                value_to_sql(field.value()),
                now,
                now
            ],
        )?;
        field.mark_persisted(FieldId::from_raw(self.conn.last_insert_rowid()), now, now);
        Ok(())
    }

    fn update_field(&self, field: &mut Field) -> StorageResult<()> {
        let id = field.id().ok_or(StorageError::NotPersisted("field"))?;
        let revision_id = field
            .revision_id()
            .ok_or(StorageError::NotPersisted("field revision"))?;
        let table = field.field_type().table();
        let weight = weight_to_sql(field.weight())?;
        let now = Utc::now();
        let changed = self.conn.execute(
            &format!(
                "UPDATE {table} SET name = ?1, weight = ?2, revision_id = ?3, value = ?4, updated_at = ?5
                 WHERE id = ?6"
            ),
            params![
                field.name(),
                weight,
                revision_id.get(),
                value_to_sql(field.value()),
                now,
                id.get()
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RowNotFound { table, id: id.get() });
        }
        let created_at = field.created_at().unwrap_or(now);
        field.mark_persisted(id, created_at, now);
        Ok(())
    }

    fn delete_field(&self, field_type: FieldType, id: FieldId) -> StorageResult<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", field_type.table()),
            params![id.get()],
        )?;
        Ok(())
    }

    fn fields_for_revision(
        &self,
        field_type: FieldType,
        revision_id: RevisionId,
    ) -> StorageResult<Vec<FieldRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FIELD_COLUMNS} FROM {} WHERE revision_id = ?1 ORDER BY name, weight",
            field_type.table()
        ))?;
        let rows = stmt.query_map(params![revision_id.get()], |row| {
            field_from_row(field_type, row)
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_fields_for_revisions(
        &self,
        field_type: FieldType,
        revision_ids: &[RevisionId],
    ) -> StorageResult<usize> {
        if revision_ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE revision_id IN ({})",
                field_type.table(),
                placeholders(revision_ids.len())
            ),
            params_from_iter(revision_ids.iter().map(RevisionId::get)),
        )?;
        Ok(deleted)
    }
}

// ── Row mapping ──────────────────────────────────────────────────

fn content_from_row(row: &Row<'_>) -> rusqlite::Result<Content> {
    Ok(Content::restored(
        ContentId::from_raw(row.get(0)?),
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn revision_from_row(row: &Row<'_>) -> rusqlite::Result<Revision> {
    let language: i64 = row.get(2)?;
    let language_id = LanguageId::new(language)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;
    Ok(Revision::restored(
        RevisionId::from_raw(row.get(0)?),
        ContentId::from_raw(row.get(1)?),
        language_id,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn field_from_row(field_type: FieldType, row: &Row<'_>) -> rusqlite::Result<FieldRow> {
    let weight: i64 = row.get(2)?;
    let weight = usize::try_from(weight)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;
    let value = value_from_sql(field_type, row.get_ref(4)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(FieldRow {
        id: FieldId::from_raw(row.get(0)?),
        name: row.get(1)?,
        weight,
        revision_id: RevisionId::from_raw(row.get(3)?),
        value,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

// ── Value encoding ───────────────────────────────────────────────

fn value_column_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String | FieldType::Text | FieldType::Date | FieldType::Datetime => "TEXT",
        FieldType::Integer | FieldType::Boolean | FieldType::Entity => "INTEGER",
        FieldType::Double => "REAL",
    }
}

fn value_to_sql(value: &StoredValue) -> SqlValue {
    match value {
        StoredValue::String(s) | StoredValue::Text(s) => SqlValue::Text(s.clone()),
        StoredValue::Integer(i) => SqlValue::Integer(*i),
        StoredValue::Double(d) => SqlValue::Real(*d),
        StoredValue::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        StoredValue::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
        StoredValue::Datetime(dt) => SqlValue::Text(dt.format(DATETIME_FORMAT).to_string()),
        StoredValue::Entity(id) => SqlValue::Integer(id.get()),
    }
}

fn value_from_sql(field_type: FieldType, raw: ValueRef<'_>) -> StorageResult<StoredValue> {
    let mismatch = || {
        StorageError::InvalidData(format!(
            "{} holds a {:?} value",
            field_type.table(),
            raw.data_type()
        ))
    };
    let text = || -> StorageResult<String> {
        raw.as_str()
            .map(str::to_owned)
            .map_err(|e| StorageError::InvalidData(e.to_string()))
    };
    let value = match (field_type, raw) {
        (FieldType::String, ValueRef::Text(_)) => StoredValue::String(text()?),
        (FieldType::Text, ValueRef::Text(_)) => StoredValue::Text(text()?),
        (FieldType::Integer, ValueRef::Integer(i)) => StoredValue::Integer(i),
        (FieldType::Double, ValueRef::Real(d)) => StoredValue::Double(d),
        #[allow(clippy::cast_precision_loss)]
        (FieldType::Double, ValueRef::Integer(i)) => StoredValue::Double(i as f64),
        (FieldType::Boolean, ValueRef::Integer(i)) => StoredValue::Boolean(i != 0),
        (FieldType::Date, ValueRef::Text(_)) => StoredValue::Date(
            NaiveDate::parse_from_str(&text()?, DATE_FORMAT)
                .map_err(|e| StorageError::InvalidData(format!("bad date: {e}")))?,
        ),
        (FieldType::Datetime, ValueRef::Text(_)) => StoredValue::Datetime(
            NaiveDateTime::parse_from_str(&text()?, DATETIME_FORMAT)
                .map_err(|e| StorageError::InvalidData(format!("bad datetime: {e}")))?,
        ),
        (FieldType::Entity, ValueRef::Integer(i)) => StoredValue::Entity(ContentId::from_raw(i)),
        _ => return Err(mismatch()),
    };
    Ok(value)
}

fn weight_to_sql(weight: usize) -> StorageResult<i64> {
    i64::try_from(weight)
        .map_err(|_| StorageError::InvalidData(format!("field weight {weight} does not fit a row")))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
