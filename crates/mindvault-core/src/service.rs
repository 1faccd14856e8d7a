//! Read/write paths over a store and the field cipher.
//!
//! The service owns the only places plaintext crosses the storage
//! boundary: `seal` exactly once per create and once per edit, `open`
//! once per fetched record. A record that will not open is degraded to an
//! empty body; its metadata survives and the rest of the batch is never
//! affected.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::classify::{MoodClassifier, NeutralFallback};
use crate::crypto::{FieldCipher, KeySource};
use crate::error::{MindvaultError, Result};
use crate::journal::{
    mood_score, normalize_attachments, normalize_tags, Attachment, Emotion, Mood,
};
use crate::storage::{EntryFilter, JournalStore, NewStoredEntry, StoredEntry};

/// Default window for plain listing (newest first).
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Default window for filtered search.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// A journal entry as callers see it: body decrypted, or empty when the
/// sealed record would not open.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub id: Uuid,
    /// Decrypted body; empty string when the content is unavailable.
    pub content: String,
    pub emotion: Emotion,
    pub stress: u8,
    pub mood_score: u8,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub created_at: chrono::DateTime<Utc>,
    pub edited_at: Option<chrono::DateTime<Utc>>,
}

/// Receipt returned from entry creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReceipt {
    pub id: Uuid,
    pub emotion: Emotion,
    pub stress: u8,
    pub mood_score: u8,
}

/// Changes to apply to an existing entry. Absent fields are untouched;
/// a present `text` re-seals the body under a completely fresh triple.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

/// The journal service: store + cipher + classifier.
pub struct Journal<S: JournalStore> {
    store: S,
    cipher: FieldCipher,
    classifier: Box<dyn MoodClassifier>,
}

impl<S: JournalStore> Journal<S> {
    /// Build a journal with the default neutral-fallback classifier.
    pub fn new(store: S, cipher: FieldCipher) -> Self {
        Self::with_classifier(store, cipher, Box::new(NeutralFallback))
    }

    /// Build a journal with an external classifier implementation.
    pub fn with_classifier(
        store: S,
        cipher: FieldCipher,
        classifier: Box<dyn MoodClassifier>,
    ) -> Self {
        Self {
            store,
            cipher,
            classifier,
        }
    }

    /// Where the process key came from; degraded sources should be
    /// surfaced to the operator at startup.
    pub fn key_source(&self) -> KeySource {
        self.cipher.key_source()
    }

    /// Create an entry: classify (unless the caller supplied a mood),
    /// seal the body once, persist.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::InvalidInput` for an empty body and
    /// `MindvaultError::Crypto` if sealing fails (fatal; nothing is
    /// written).
    pub fn create(
        &mut self,
        text: &str,
        tags: Vec<String>,
        attachments: Vec<Attachment>,
        mood: Option<Mood>,
    ) -> Result<CreateReceipt> {
        if text.is_empty() {
            return Err(MindvaultError::InvalidInput("text required".to_string()));
        }

        let Mood { emotion, stress } = mood.unwrap_or_else(|| self.classifier.classify(text));
        let stress = stress.min(100);
        let score = mood_score(stress);

        let body = self.cipher.seal(text)?;
        let entry = NewStoredEntry::new(body, emotion, stress, score)
            .with_tags(normalize_tags(&tags))
            .with_attachments(normalize_attachments(&attachments));
        let id = self.store.insert_entry(&entry)?;

        Ok(CreateReceipt {
            id,
            emotion,
            stress,
            mood_score: score,
        })
    }

    /// Fetch a single entry, decrypting its body.
    pub fn entry(&self, id: &Uuid) -> Result<Option<EntryView>> {
        Ok(self.store.get_entry(id)?.map(|entry| self.view(entry)))
    }

    /// List the newest entries (default window of [`DEFAULT_LIST_LIMIT`]).
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<EntryView>> {
        let filter = EntryFilter::new().limit(limit.unwrap_or(DEFAULT_LIST_LIMIT));
        self.fetch(&filter)
    }

    /// Search by tag and/or emotion over the plaintext metadata columns.
    /// Encrypted bodies cannot be searched; this is the deliberate
    /// trade-off of leaving metadata unencrypted.
    pub fn search(
        &self,
        tag: Option<String>,
        emotion: Option<Emotion>,
        limit: Option<usize>,
    ) -> Result<Vec<EntryView>> {
        let mut filter = EntryFilter::new().limit(limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
        if let Some(tag) = tag {
            filter = filter.tag(tag);
        }
        if let Some(emotion) = emotion {
            filter = filter.emotion(emotion);
        }
        self.fetch(&filter)
    }

    /// Apply an update. A new body is sealed once and replaces the entire
    /// previous triple; the old ciphertext, nonce, and tag are discarded.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::EntryNotFound` if the entry does not
    /// exist.
    pub fn edit(&mut self, id: &Uuid, update: EntryUpdate) -> Result<()> {
        if self.store.get_entry(id)?.is_none() {
            return Err(MindvaultError::EntryNotFound(*id));
        }

        if let Some(ref text) = update.text {
            let body = self.cipher.seal(text)?;
            self.store.replace_body(id, &body, Utc::now())?;
        }
        if let Some(ref tags) = update.tags {
            self.store.replace_tags(id, &normalize_tags(tags))?;
        }
        if let Some(ref attachments) = update.attachments {
            self.store
                .replace_attachments(id, &normalize_attachments(attachments))?;
        }

        Ok(())
    }

    /// Delete an entry, destroying its sealed triple with it.
    ///
    /// # Returns
    ///
    /// Returns `true` if an entry was removed; deleting a missing entry
    /// is not an error.
    pub fn delete(&mut self, id: &Uuid) -> Result<bool> {
        self.store.delete_entry(id)
    }

    fn fetch(&self, filter: &EntryFilter) -> Result<Vec<EntryView>> {
        let entries = self.store.list_entries(filter)?;
        Ok(entries.into_iter().map(|entry| self.view(entry)).collect())
    }

    /// Decrypt one stored entry into its caller-facing view. Failure to
    /// open degrades that record to an empty body; metadata is kept.
    fn view(&self, entry: StoredEntry) -> EntryView {
        let content = self.cipher.open(&entry.body).unwrap_or_default();
        EntryView {
            id: entry.id,
            content,
            emotion: entry.emotion,
            stress: entry.stress,
            mood_score: entry.mood_score,
            tags: entry.tags,
            attachments: entry.attachments,
            created_at: entry.created_at,
            edited_at: entry.edited_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SealedRecord;
    use crate::storage::SqliteJournalStore;

    fn test_journal() -> Journal<SqliteJournalStore> {
        let store = SqliteJournalStore::in_memory().expect("in-memory store");
        let cipher = FieldCipher::from_config(None).expect("cipher");
        Journal::new(store, cipher)
    }

    #[test]
    fn test_create_uses_fallback_classifier() {
        let mut journal = test_journal();
        let receipt = journal
            .create("I felt anxious today", vec![], vec![], None)
            .unwrap();

        assert_eq!(receipt.emotion, Emotion::Neutral);
        assert_eq!(receipt.stress, 50);
        assert_eq!(receipt.mood_score, 50);
    }

    #[test]
    fn test_create_honors_supplied_mood() {
        let mut journal = test_journal();
        let mood = Mood {
            emotion: Emotion::Anxious,
            stress: 80,
        };
        let receipt = journal
            .create("rough day", vec![], vec![], Some(mood))
            .unwrap();

        assert_eq!(receipt.emotion, Emotion::Anxious);
        assert_eq!(receipt.stress, 80);
        assert_eq!(receipt.mood_score, 20);
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut journal = test_journal();
        assert!(matches!(
            journal.create("", vec![], vec![], None),
            Err(MindvaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_read_back_plaintext() {
        let mut journal = test_journal();
        let receipt = journal
            .create("I felt anxious today", vec!["work".to_string()], vec![], None)
            .unwrap();

        let view = journal.entry(&receipt.id).unwrap().unwrap();
        assert_eq!(view.content, "I felt anxious today");
        assert_eq!(view.tags, vec!["work".to_string()]);
        assert!(view.edited_at.is_none());
    }

    #[test]
    fn test_batch_survives_one_corrupt_record() {
        let mut journal = test_journal();
        let mut ids = Vec::new();
        for i in 0..5 {
            let receipt = journal
                .create(&format!("entry number {}", i), vec![], vec![], None)
                .unwrap();
            ids.push(receipt.id);
        }

        // Clobber one record's triple with garbage that will never verify.
        let garbage = SealedRecord {
            ciphertext: "Z2FyYmFnZQ==".to_string(),
            nonce: "AAAAAAAAAAAAAAAA".to_string(),
            tag: "AAAAAAAAAAAAAAAAAAAAAA==".to_string(),
        };
        journal
            .store
            .replace_body(&ids[2], &garbage, Utc::now())
            .unwrap();

        let views = journal.list(None).unwrap();
        assert_eq!(views.len(), 5);

        let corrupted = views.iter().find(|view| view.id == ids[2]).unwrap();
        assert_eq!(corrupted.content, "");
        // Metadata survives even when the body does not open.
        assert_eq!(corrupted.emotion, Emotion::Neutral);
        assert_eq!(corrupted.stress, 50);

        for view in views.iter().filter(|view| view.id != ids[2]) {
            assert!(view.content.starts_with("entry number "));
        }
    }

    #[test]
    fn test_edit_reseals_whole_triple() {
        let mut journal = test_journal();
        let receipt = journal.create("v1", vec![], vec![], None).unwrap();

        let before = journal.store.get_entry(&receipt.id).unwrap().unwrap().body;
        journal
            .edit(
                &receipt.id,
                EntryUpdate {
                    text: Some("v2".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let after = journal.store.get_entry(&receipt.id).unwrap().unwrap();

        assert_ne!(after.body.ciphertext, before.ciphertext);
        assert_ne!(after.body.nonce, before.nonce);
        assert_ne!(after.body.tag, before.tag);
        assert!(after.edited_at.is_some());

        let view = journal.entry(&receipt.id).unwrap().unwrap();
        assert_eq!(view.content, "v2");
    }

    #[test]
    fn test_edit_missing_entry_fails() {
        let mut journal = test_journal();
        let missing = Uuid::new_v4();
        assert!(matches!(
            journal.edit(&missing, EntryUpdate::default()),
            Err(MindvaultError::EntryNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_edit_replaces_tags_only() {
        let mut journal = test_journal();
        let receipt = journal
            .create("text stays", vec!["old".to_string()], vec![], None)
            .unwrap();

        journal
            .edit(
                &receipt.id,
                EntryUpdate {
                    tags: Some(vec!["new".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let view = journal.entry(&receipt.id).unwrap().unwrap();
        assert_eq!(view.content, "text stays");
        assert_eq!(view.tags, vec!["new".to_string()]);
        // Tags-only edits do not re-seal the body.
        assert!(view.edited_at.is_none());
    }

    #[test]
    fn test_oversized_input_is_capped() {
        let mut journal = test_journal();
        let tags: Vec<String> = (0..20).map(|i| format!("tag-{}", i)).collect();
        let attachments: Vec<Attachment> = (0..5)
            .map(|i| Attachment {
                kind: format!("image/png-{}", i),
                data: "data".to_string(),
            })
            .collect();

        let receipt = journal
            .create("capped", tags, attachments, None)
            .unwrap();
        let view = journal.entry(&receipt.id).unwrap().unwrap();

        assert_eq!(view.tags.len(), crate::journal::MAX_TAGS);
        assert_eq!(view.attachments.len(), crate::journal::MAX_ATTACHMENTS);
    }

    #[test]
    fn test_search_by_tag_and_emotion() {
        let mut journal = test_journal();
        let anxious = Mood {
            emotion: Emotion::Anxious,
            stress: 70,
        };
        journal
            .create("work worry", vec!["work".to_string()], vec![], Some(anxious))
            .unwrap();
        journal
            .create("home note", vec!["home".to_string()], vec![], None)
            .unwrap();

        let by_tag = journal.search(Some("work".to_string()), None, None).unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].content, "work worry");

        let by_emotion = journal.search(None, Some(Emotion::Anxious), None).unwrap();
        assert_eq!(by_emotion.len(), 1);

        let both = journal
            .search(Some("home".to_string()), Some(Emotion::Anxious), None)
            .unwrap();
        assert!(both.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut journal = test_journal();
        let receipt = journal.create("short lived", vec![], vec![], None).unwrap();

        assert!(journal.delete(&receipt.id).unwrap());
        assert!(!journal.delete(&receipt.id).unwrap());
        assert!(journal.entry(&receipt.id).unwrap().is_none());
    }
}
