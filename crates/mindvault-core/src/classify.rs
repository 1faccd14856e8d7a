//! Pluggable mood classification seam.
//!
//! Scoring an entry's emotional tone is an external concern (the
//! reference deployment posts the text to an AI sidecar). The core only
//! defines the seam and the fallback used when no classifier is wired up
//! or the external one is unreachable.

use crate::journal::{Emotion, Mood};

/// Stress score assumed when classification is unavailable.
pub const FALLBACK_STRESS: u8 = 50;

/// Produces an emotion/stress pair for a plaintext entry body.
///
/// Implementations see plaintext before it is sealed; they must not
/// retain it. Classification happens on the write path only, so a slow
/// or failing implementation should fall back internally rather than
/// error; the write path treats the returned mood as authoritative.
pub trait MoodClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Mood;
}

/// Default classifier: neutral emotion, mid-scale stress.
///
/// Matches the behavior of a deployment whose external classifier is
/// down: entries are still written, just without a meaningful score.
pub struct NeutralFallback;

impl MoodClassifier for NeutralFallback {
    fn classify(&self, _text: &str) -> Mood {
        Mood {
            emotion: Emotion::Neutral,
            stress: FALLBACK_STRESS,
        }
    }
}
