//! # Mindvault Core
//!
//! Core library for Mindvault - a journal whose entry bodies are
//! field-encrypted with AES-256-GCM before they ever reach storage.
//!
//! This crate provides the encryption core, storage abstractions, and the
//! read/write paths independent of any CLI or HTTP interface.
//!
//! ## Architecture
//!
//! - **crypto**: the field cipher (seal/open) and key provisioning
//! - **journal**: entry domain types and write-path input hygiene
//! - **classify**: pluggable mood classification seam
//! - **storage**: storage trait and the SQLite backend
//! - **service**: the read/write-path collaborators tying it together
//!
//! ## Searchability trade-off
//!
//! Entry bodies are opaque ciphertext at rest, so full-text search over
//! plaintext is impossible by design. Emotion labels, scores, and tags
//! stay plaintext precisely so those filters keep working.

pub mod classify;
pub mod crypto;
pub mod error;
pub mod journal;
pub mod service;
pub mod storage;

pub use crypto::{FieldCipher, KeySource, MasterKey, SealedRecord};
pub use error::{MindvaultError, Result};
pub use journal::{Attachment, Emotion, Mood};
pub use service::{CreateReceipt, EntryUpdate, EntryView, Journal};
pub use storage::{JournalStore, SqliteJournalStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
