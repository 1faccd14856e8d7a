//! SQLite storage backend.
//!
//! Entry bodies arrive already sealed, so the database file itself is
//! plain SQLite: the three sealed columns are opaque text, while emotion,
//! scores, tags, and timestamps stay as ordinary indexed columns the
//! filter queries run against.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::crypto::SealedRecord;
use crate::error::{MindvaultError, Result};
use crate::journal::Attachment;
use crate::storage::traits::JournalStore;
use crate::storage::types::{EntryFilter, NewStoredEntry, StoredEntry};

use row::EntryRow;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        content_enc TEXT NOT NULL,
        nonce TEXT NOT NULL,
        auth_tag TEXT NOT NULL,
        emotion TEXT NOT NULL,
        stress INTEGER NOT NULL,
        mood_score INTEGER NOT NULL,
        tags_json TEXT,
        attachments_json TEXT,
        created_at TEXT NOT NULL,
        edited_at TEXT
    );

    CREATE INDEX IF NOT EXISTS entries_emotion ON entries(emotion);
    CREATE INDEX IF NOT EXISTS entries_created_at ON entries(created_at);
"#;

const SELECT_COLUMNS: &str = "id, content_enc, nonce, auth_tag, emotion, stress, mood_score, \
                              tags_json, attachments_json, created_at, edited_at";

/// SQLite-backed journal store.
pub struct SqliteJournalStore {
    conn: Mutex<Connection>,
}

impl SqliteJournalStore {
    /// Open (or create) a journal database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store. Useful for tests and throwaway sessions;
    /// contents die with the process.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is
    /// poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MindvaultError::Storage("SQLite connection poisoned".to_string()))
    }

    fn tags_to_json(tags: &[String]) -> Result<Option<String>> {
        if tags.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::to_string(tags).map_err(|e| {
                MindvaultError::Storage(format!("Failed to serialize tags: {}", e))
            })?))
        }
    }

    fn attachments_to_json(attachments: &[Attachment]) -> Result<Option<String>> {
        if attachments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::to_string(attachments).map_err(|e| {
                MindvaultError::Storage(format!("Failed to serialize attachments: {}", e))
            })?))
        }
    }

    fn row_from_query(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
        Ok(EntryRow {
            id: row.get(0)?,
            content_enc: row.get(1)?,
            nonce: row.get(2)?,
            auth_tag: row.get(3)?,
            emotion: row.get(4)?,
            stress: row.get(5)?,
            mood_score: row.get(6)?,
            tags_json: row.get(7)?,
            attachments_json: row.get(8)?,
            created_at: row.get(9)?,
            edited_at: row.get(10)?,
        })
    }
}

impl JournalStore for SqliteJournalStore {
    fn insert_entry(&mut self, entry: &NewStoredEntry) -> Result<Uuid> {
        let conn = self.lock_conn()?;

        let id = Uuid::new_v4();
        let created_at = entry.created_at.unwrap_or_else(Utc::now);
        let tags_json = Self::tags_to_json(&entry.tags)?;
        let attachments_json = Self::attachments_to_json(&entry.attachments)?;

        conn.execute(
            r#"
            INSERT INTO entries (
                id,
                content_enc,
                nonce,
                auth_tag,
                emotion,
                stress,
                mood_score,
                tags_json,
                attachments_json,
                created_at,
                edited_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
            (
                id.to_string(),
                &entry.body.ciphertext,
                &entry.body.nonce,
                &entry.body.tag,
                entry.emotion.as_str(),
                entry.stress as i64,
                entry.mood_score as i64,
                tags_json,
                attachments_json,
                created_at.to_rfc3339(),
            ),
        )?;

        Ok(id)
    }

    fn get_entry(&self, id: &Uuid) -> Result<Option<StoredEntry>> {
        let conn = self.lock_conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM entries WHERE id = ?", SELECT_COLUMNS),
                [id.to_string()],
                Self::row_from_query,
            )
            .optional()?;

        match result {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<StoredEntry>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref tag) = filter.tag {
            conditions.push(
                "tags_json IS NOT NULL AND EXISTS (SELECT 1 FROM json_each(tags_json) WHERE value = ?)"
                    .to_string(),
            );
            params.push(Box::new(tag.clone()));
        }

        if let Some(emotion) = filter.emotion {
            conditions.push("emotion = ?".to_string());
            params.push(Box::new(emotion.as_str().to_string()));
        }

        let mut query = format!("SELECT {} FROM entries", SELECT_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            Self::row_from_query,
        )?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }

        Ok(entries)
    }

    fn replace_body(
        &mut self,
        id: &Uuid,
        body: &SealedRecord,
        edited_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;

        let updated = conn.execute(
            "UPDATE entries SET content_enc = ?, nonce = ?, auth_tag = ?, edited_at = ? WHERE id = ?",
            (
                &body.ciphertext,
                &body.nonce,
                &body.tag,
                edited_at.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        if updated == 0 {
            return Err(MindvaultError::EntryNotFound(*id));
        }
        Ok(())
    }

    fn replace_tags(&mut self, id: &Uuid, tags: &[String]) -> Result<()> {
        let conn = self.lock_conn()?;

        let tags_json = Self::tags_to_json(tags)?;
        let updated = conn.execute(
            "UPDATE entries SET tags_json = ? WHERE id = ?",
            (tags_json, id.to_string()),
        )?;

        if updated == 0 {
            return Err(MindvaultError::EntryNotFound(*id));
        }
        Ok(())
    }

    fn replace_attachments(&mut self, id: &Uuid, attachments: &[Attachment]) -> Result<()> {
        let conn = self.lock_conn()?;

        let attachments_json = Self::attachments_to_json(attachments)?;
        let updated = conn.execute(
            "UPDATE entries SET attachments_json = ? WHERE id = ?",
            (attachments_json, id.to_string()),
        )?;

        if updated == 0 {
            return Err(MindvaultError::EntryNotFound(*id));
        }
        Ok(())
    }

    fn delete_entry(&mut self, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;

        let deleted = conn.execute("DELETE FROM entries WHERE id = ?", [id.to_string()])?;
        Ok(deleted > 0)
    }
}
