//! Cryptographic operations for Mindvault.
//!
//! Entry bodies are sealed with AES-256-GCM before they reach storage and
//! opened again on the read path. Each seal uses a fresh random 96-bit
//! nonce; the 128-bit authentication tag is kept as its own field so the
//! stored triple {ciphertext, nonce, tag} round-trips through any backend
//! that can hold three opaque strings.
//!
//! ## Security Model
//!
//! - A single 256-bit process key, provisioned once at startup (see
//!   [`key`]), immutable afterwards.
//! - Nonces come from the OS CSPRNG on every call. Nonce reuse under GCM
//!   breaks both confidentiality and integrity, so counters or any other
//!   predictable source are off the table.
//! - Decryption fails closed: a record that does not verify yields
//!   [`MindvaultError::DecryptionFailed`](crate::error::MindvaultError)
//!   and never partial plaintext.
//! - No additional associated data is bound to the ciphertext. Binding
//!   the owning entry id would be a strict hardening improvement, but it
//!   changes what existing records verify against, so it is left out.
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the storage file (bodies are unreadable without the key)
//! - Tampering with stored ciphertext, nonces, or tags
//!
//! We do NOT defend against:
//! - Compromised OS / access to process memory
//! - Loss of the key itself (an ephemeral key dies with the process)

pub mod cipher;
pub mod key;

pub use cipher::{FieldCipher, SealedRecord, NONCE_LENGTH, TAG_LENGTH};
pub use key::{provision_key, KeySource, MasterKey, KEY_LENGTH};
