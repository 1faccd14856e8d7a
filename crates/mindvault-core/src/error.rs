//! Error types for Mindvault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Mindvault operations.
pub type Result<T> = std::result::Result<T, MindvaultError>;

/// Core error type for Mindvault operations.
#[derive(Debug, Error)]
pub enum MindvaultError {
    /// Authentication-tag verification failed, or the sealed record was
    /// malformed. Carries no detail on purpose: callers must not learn
    /// whether the ciphertext, nonce, or tag was at fault.
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Encryption-side error (cipher construction, randomness). Fatal:
    /// the core never falls back to storing plaintext.
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Entry not found by ID
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
