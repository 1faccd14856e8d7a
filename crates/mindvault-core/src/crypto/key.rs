//! Process key provisioning.
//!
//! The key is established exactly once at startup from an optional
//! base64-encoded configuration value and never changes for the life of
//! the process. Provisioning never fails a previously-working deployment:
//! bad or missing key material degrades to a documented insecure fallback
//! instead of refusing to start, and the degraded mode is reported as an
//! inspectable [`KeySource`] the embedding application can alarm on.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{MindvaultError, Result};

/// Length of the symmetric key in bytes (256-bit AES key).
pub const KEY_LENGTH: usize = 32;

/// The process-wide AES-256-GCM key.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped, reducing the window of exposure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MasterKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher
    /// construction.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Where the process key came from.
///
/// `Derived` and `Ephemeral` are degraded configurations. They keep the
/// process running, but the embedding application should surface them
/// loudly: a derived key has far less entropy than a random one, and an
/// ephemeral key makes every sealed record unreadable after restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// A configured value decoded to exactly 32 bytes and is used as-is.
    Configured,
    /// A configured value was present but did not decode to exactly
    /// 32 bytes; the key is the SHA-256 digest of the configured string.
    Derived,
    /// Nothing was configured; the key is random and held only in process
    /// memory. Restart permanently orphans everything sealed under it.
    Ephemeral,
}

impl KeySource {
    /// Whether this source is one of the insecure fallbacks.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, KeySource::Configured)
    }

    /// Startup warning for degraded sources, `None` when properly
    /// configured.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            KeySource::Configured => None,
            KeySource::Derived => Some(
                "configured key is not 32 bytes of base64; using a key derived \
                 from it (DO NOT USE IN PROD)",
            ),
            KeySource::Ephemeral => Some(
                "no key configured; using an ephemeral key, entries will be \
                 unreadable after restart (DO NOT USE IN PROD)",
            ),
        }
    }
}

/// Establish the process key from an optional configured value.
///
/// Policy, in order:
/// 1. Value decodes (standard base64) to exactly 32 bytes: used directly.
/// 2. Value present but malformed or the wrong length: the key is
///    `SHA-256(configured string bytes)`. Deterministic, so a deployment
///    that has always run this way keeps decrypting its data.
/// 3. No value (or blank): 32 random bytes from the OS CSPRNG.
///
/// Never truncates or pads the configured material, and never fails
/// startup over key configuration; the only error is the OS refusing to
/// provide randomness.
pub fn provision_key(configured: Option<&str>) -> Result<(MasterKey, KeySource)> {
    let configured = configured.map(str::trim).filter(|value| !value.is_empty());

    let Some(value) = configured else {
        let mut key = [0u8; KEY_LENGTH];
        getrandom::getrandom(&mut key)
            .map_err(|e| MindvaultError::Crypto(format!("OS randomness unavailable: {}", e)))?;
        return Ok((MasterKey::from_bytes(key), KeySource::Ephemeral));
    };

    if let Ok(mut decoded) = STANDARD.decode(value) {
        if decoded.len() == KEY_LENGTH {
            let mut key = [0u8; KEY_LENGTH];
            key.copy_from_slice(&decoded);
            decoded.zeroize();
            return Ok((MasterKey::from_bytes(key), KeySource::Configured));
        }
        decoded.zeroize();
    }

    // Hash the configured string itself, not a partial decode, so the
    // fallback is stable across base64 quirks in the source material.
    let digest = Sha256::digest(value.as_bytes());
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&digest);
    Ok((MasterKey::from_bytes(key), KeySource::Derived))
}
