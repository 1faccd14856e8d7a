//! AES-256-GCM field cipher for entry bodies.
//!
//! Stored form is a triple of standard-base64 strings: variable-length
//! ciphertext, 12-byte nonce, 16-byte authentication tag. The three
//! fields are only meaningful together; the storage layer persists them
//! as one unit without interpreting them.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::key::{provision_key, KeySource, MasterKey};
use crate::error::{MindvaultError, Result};

/// Nonce length in bytes (96-bit GCM nonce).
pub const NONCE_LENGTH: usize = 12;

/// Authentication tag length in bytes (128-bit GCM tag).
pub const TAG_LENGTH: usize = 16;

/// One sealed entry body: the {ciphertext, nonce, tag} triple, each field
/// standard base64 without line wrapping.
///
/// A record is created whole by [`FieldCipher::seal`], persisted whole,
/// and destroyed whole when its owning entry is deleted or re-sealed on
/// edit. Fields must never be split up or reused across records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedRecord {
    /// Encrypted body bytes, base64.
    pub ciphertext: String,
    /// Per-call random nonce, base64 of 12 bytes.
    pub nonce: String,
    /// GCM authentication tag, base64 of 16 bytes.
    pub tag: String,
}

/// Seals and opens entry bodies under the immutable process key.
///
/// Stateless per call: `seal` and `open` only read the shared key and
/// allocate their own buffers, so a single instance may be shared across
/// threads without locking.
pub struct FieldCipher {
    cipher: Aes256Gcm,
    source: KeySource,
}

impl FieldCipher {
    /// Build a cipher from an already-provisioned key.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::Crypto` if the AES-GCM primitive cannot
    /// be constructed. This is fatal by contract: the core never degrades
    /// to unauthenticated or unencrypted storage.
    pub fn new(key: &MasterKey, source: KeySource) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| MindvaultError::Crypto(format!("cipher init failed: {}", e)))?;
        Ok(Self { cipher, source })
    }

    /// Provision the key from an optional configured base64 value and
    /// build the cipher in one step (see [`provision_key`] for the
    /// fallback policy).
    pub fn from_config(configured: Option<&str>) -> Result<Self> {
        let (key, source) = provision_key(configured)?;
        Self::new(&key, source)
    }

    /// Where the key behind this cipher came from.
    pub fn key_source(&self) -> KeySource {
        self.source
    }

    /// Encrypt a plaintext body into a sealed record.
    ///
    /// Generates a fresh random nonce for this call; sealing the same
    /// text twice yields two entirely different records. No side effects
    /// beyond consuming OS randomness.
    ///
    /// # Errors
    ///
    /// Returns `MindvaultError::Crypto` if randomness is unavailable or
    /// the primitive rejects the operation. Both are fatal for the write
    /// path; there is no plaintext fallback.
    pub fn seal(&self, plaintext: &str) -> Result<SealedRecord> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| MindvaultError::Crypto(format!("OS randomness unavailable: {}", e)))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let mut combined = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| MindvaultError::Crypto(format!("encryption failed: {}", e)))?;

        // RustCrypto appends the tag to the ciphertext; split it back out
        // so the triple persists as three separate fields.
        let tag = combined.split_off(combined.len() - TAG_LENGTH);

        Ok(SealedRecord {
            ciphertext: STANDARD.encode(&combined),
            nonce: STANDARD.encode(nonce_bytes),
            tag: STANDARD.encode(&tag),
        })
    }

    /// Decrypt a sealed record back into its plaintext body.
    ///
    /// Fails closed: any malformed field, wrong-length nonce or tag,
    /// verification failure, or non-UTF-8 plaintext yields
    /// `MindvaultError::DecryptionFailed` and never partial output.
    /// Callers on batch read paths substitute empty content for the
    /// failing record and keep going; one bad record must not block its
    /// siblings.
    pub fn open(&self, record: &SealedRecord) -> Result<String> {
        let ciphertext = STANDARD
            .decode(&record.ciphertext)
            .map_err(|_| MindvaultError::DecryptionFailed)?;
        let nonce_bytes = STANDARD
            .decode(&record.nonce)
            .map_err(|_| MindvaultError::DecryptionFailed)?;
        let tag = STANDARD
            .decode(&record.tag)
            .map_err(|_| MindvaultError::DecryptionFailed)?;

        if nonce_bytes.len() != NONCE_LENGTH || tag.len() != TAG_LENGTH {
            return Err(MindvaultError::DecryptionFailed);
        }

        let mut combined = ciphertext;
        combined.extend_from_slice(&tag);

        let nonce = Nonce::from_slice(&nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, combined.as_slice())
            .map_err(|_| MindvaultError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| MindvaultError::DecryptionFailed)
    }
}
