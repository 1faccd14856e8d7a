//! Journal entry domain types and write-path input hygiene.
//!
//! An entry's free-text body exists in plaintext only in memory; at rest
//! it is a sealed triple (see [`crate::crypto`]). Everything else on an
//! entry is deliberately plaintext metadata so tag and emotion filters
//! keep working against the store. That is a confidentiality versus
//! searchability trade-off, not an oversight.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MindvaultError;

/// Maximum number of tags kept per entry.
pub const MAX_TAGS: usize = 10;

/// Maximum characters kept per tag.
pub const MAX_TAG_CHARS: usize = 24;

/// Maximum number of attachments kept per entry.
pub const MAX_ATTACHMENTS: usize = 3;

/// Maximum characters kept for an attachment kind label.
pub const MAX_ATTACHMENT_KIND_CHARS: usize = 50;

/// Maximum characters kept for inline attachment data.
pub const MAX_ATTACHMENT_DATA_CHARS: usize = 500_000;

/// Closed set of emotion labels.
///
/// Kept as an enum rather than free text so the emotion filter cannot be
/// poisoned by unindexable variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Anxious,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Anxious => "Anxious",
            Emotion::Neutral => "Neutral",
        }
    }
}

impl FromStr for Emotion {
    type Err = MindvaultError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Happy" => Ok(Emotion::Happy),
            "Sad" => Ok(Emotion::Sad),
            "Angry" => Ok(Emotion::Angry),
            "Anxious" => Ok(Emotion::Anxious),
            "Neutral" => Ok(Emotion::Neutral),
            other => Err(MindvaultError::InvalidInput(format!(
                "Unknown emotion label: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline attachment carried alongside an entry (plaintext metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment kind label (e.g. a MIME type).
    pub kind: String,
    /// Inline attachment payload (e.g. a data URL).
    pub data: String,
}

/// Emotion/stress pair produced by a classifier or supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mood {
    pub emotion: Emotion,
    /// Stress score, 0 (calm) to 100.
    pub stress: u8,
}

/// Derived mood score: the inverse of stress on the same 0-100 scale.
pub fn mood_score(stress: u8) -> u8 {
    100 - stress.min(100)
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Cap the tag list to [`MAX_TAGS`] entries of [`MAX_TAG_CHARS`] each.
///
/// Oversized input is truncated, not rejected; the write path accepts
/// whatever the caller sends and keeps a bounded slice of it.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .take(MAX_TAGS)
        .map(|tag| truncate_chars(tag, MAX_TAG_CHARS))
        .collect()
}

/// Cap the attachment list to [`MAX_ATTACHMENTS`] entries with bounded
/// kind and data fields.
pub fn normalize_attachments(attachments: &[Attachment]) -> Vec<Attachment> {
    attachments
        .iter()
        .take(MAX_ATTACHMENTS)
        .map(|attachment| Attachment {
            kind: truncate_chars(&attachment.kind, MAX_ATTACHMENT_KIND_CHARS),
            data: truncate_chars(&attachment.data, MAX_ATTACHMENT_DATA_CHARS),
        })
        .collect()
}
