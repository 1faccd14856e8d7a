//! Storage trait definition.
//!
//! The `JournalStore` trait defines the interface that storage backends
//! must implement. The store persists sealed bodies as opaque text and
//! plaintext metadata as queryable columns; it never interprets, splits,
//! or reuses the sealed triple.

use uuid::Uuid;

use super::types::{EntryFilter, NewStoredEntry, StoredEntry};
use crate::crypto::SealedRecord;
use crate::error::Result;

/// Storage interface for field-encrypted journal entries.
///
/// All implementations must ensure:
/// - The three sealed fields are stored and retrieved together, verbatim
/// - Metadata (emotion, tags, scores, timestamps) stays queryable
/// - An entry's sealed triple is destroyed with the entry, and replaced
///   whole on edit, never patched in place
pub trait JournalStore: Send + Sync {
    /// Insert a new entry.
    ///
    /// # Returns
    ///
    /// Returns the UUID of the created entry.
    fn insert_entry(&mut self, entry: &NewStoredEntry) -> Result<Uuid>;

    /// Get an entry by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(entry))` if found, `Ok(None)` if not found.
    fn get_entry(&self, id: &Uuid) -> Result<Option<StoredEntry>>;

    /// List entries matching the filter, newest first.
    fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<StoredEntry>>;

    /// Replace an entry's sealed body wholesale and stamp `edited_at`.
    ///
    /// The previous triple is discarded; nothing of it survives.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::EntryNotFound` if the entry does not
    /// exist.
    fn replace_body(
        &mut self,
        id: &Uuid,
        body: &SealedRecord,
        edited_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()>;

    /// Replace an entry's tag list.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::EntryNotFound` if the entry does not
    /// exist.
    fn replace_tags(&mut self, id: &Uuid, tags: &[String]) -> Result<()>;

    /// Replace an entry's attachment list.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::EntryNotFound` if the entry does not
    /// exist.
    fn replace_attachments(
        &mut self,
        id: &Uuid,
        attachments: &[crate::journal::Attachment],
    ) -> Result<()>;

    /// Delete an entry and its sealed triple.
    ///
    /// # Returns
    ///
    /// Returns `true` if an entry was removed, `false` if none existed.
    fn delete_entry(&mut self, id: &Uuid) -> Result<bool>;
}
