//! Storage layer: trait, data types, and the SQLite backend.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteJournalStore;
pub use traits::JournalStore;
pub use types::{EntryFilter, NewStoredEntry, StoredEntry};
