//! Entry row type for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::SealedRecord;
use crate::error::{MindvaultError, Result};
use crate::journal::Attachment;
use crate::storage::types::StoredEntry;

/// Raw row data from the entries table, before parsing into domain types.
#[derive(Debug)]
pub struct EntryRow {
    pub id: String,
    pub content_enc: String,
    pub nonce: String,
    pub auth_tag: String,
    pub emotion: String,
    pub stress: i64,
    pub mood_score: i64,
    pub tags_json: Option<String>,
    pub attachments_json: Option<String>,
    pub created_at: String,
    pub edited_at: Option<String>,
}

fn score_from_column(value: i64, column: &str) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| MindvaultError::Storage(format!("Invalid {} value: {}", column, value)))
}

impl TryFrom<EntryRow> for StoredEntry {
    type Error = MindvaultError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| MindvaultError::Storage(format!("Invalid entry UUID: {}", e)))?;
        let emotion = row
            .emotion
            .parse()
            .map_err(|_| MindvaultError::Storage(format!("Invalid emotion label: {}", row.emotion)))?;
        let stress = score_from_column(row.stress, "stress")?;
        let mood_score = score_from_column(row.mood_score, "mood_score")?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| MindvaultError::Storage(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);
        let edited_at = row
            .edited_at
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|e| MindvaultError::Storage(format!("Invalid edited_at: {}", e)))
            })
            .transpose()?;
        let tags: Vec<String> = match row.tags_json {
            Some(ref value) => serde_json::from_str(value)
                .map_err(|e| MindvaultError::Storage(format!("Invalid tags JSON: {}", e)))?,
            None => Vec::new(),
        };
        let attachments: Vec<Attachment> = match row.attachments_json {
            Some(ref value) => serde_json::from_str(value)
                .map_err(|e| MindvaultError::Storage(format!("Invalid attachments JSON: {}", e)))?,
            None => Vec::new(),
        };

        Ok(StoredEntry {
            id,
            body: SealedRecord {
                ciphertext: row.content_enc,
                nonce: row.nonce,
                tag: row.auth_tag,
            },
            emotion,
            stress,
            mood_score,
            tags,
            attachments,
            created_at,
            edited_at,
        })
    }
}
