//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SealedRecord;
use crate::journal::{Attachment, Emotion};

/// A journal entry as the store holds it: sealed body plus plaintext
/// metadata.
///
/// The sealed triple is opaque to the store; it is written and read back
/// verbatim as one unit and destroyed with the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Sealed free-text body
    pub body: SealedRecord,

    /// Emotion label (indexable)
    pub emotion: Emotion,

    /// Stress score, 0-100
    pub stress: u8,

    /// Derived mood score, 0-100
    pub mood_score: u8,

    /// Tags associated with this entry (indexable)
    pub tags: Vec<String>,

    /// Inline attachments
    pub attachments: Vec<Attachment>,

    /// When this entry was created
    pub created_at: DateTime<Utc>,

    /// When the body was last re-sealed, if ever
    pub edited_at: Option<DateTime<Utc>>,
}

/// Builder for inserting new entries.
#[derive(Debug, Clone)]
pub struct NewStoredEntry {
    /// Sealed free-text body
    pub body: SealedRecord,

    /// Emotion label
    pub emotion: Emotion,

    /// Stress score, 0-100
    pub stress: u8,

    /// Derived mood score, 0-100
    pub mood_score: u8,

    /// Tags
    pub tags: Vec<String>,

    /// Inline attachments
    pub attachments: Vec<Attachment>,

    /// Optional explicit creation time (defaults to now at insert)
    pub created_at: Option<DateTime<Utc>>,
}

impl NewStoredEntry {
    pub fn new(body: SealedRecord, emotion: Emotion, stress: u8, mood_score: u8) -> Self {
        Self {
            body,
            emotion,
            stress,
            mood_score,
            tags: Vec::new(),
            attachments: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Filter for querying entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by tag
    pub tag: Option<String>,

    /// Filter by emotion label
    pub emotion: Option<Emotion>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
