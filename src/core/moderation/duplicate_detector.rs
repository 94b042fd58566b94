// Near-duplicate detection. Compares each message against the sender's
// recent history and escalates tolerated repeats into a per-content
// cooldown.

use super::sender_state::SenderState;
use crate::core::filtering::{normalize, similarity};
use chrono::{DateTime, Duration, Utc};

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateVerdict {
    /// Not a duplicate, or too short to judge
    Allow,
    /// The content is still on cooldown from an earlier repeat limit
    CooldownActive,
    /// This repeat crossed the limit; a cooldown was just started
    RepeatLimit,
}

impl DuplicateVerdict {
    pub fn is_blocked(self) -> bool {
        self != DuplicateVerdict::Allow
    }
}

/// Run one message through the duplicate state machine.
///
/// On `Allow` the caller owns appending the raw message to the sender's
/// history - only accepted messages belong there, and this check may not
/// be the last one in the pipeline.
pub fn check(
    state: &mut SenderState,
    message: &str,
    similarity_threshold: f64,
    max_repeats: u32,
    cooldown_seconds: u64,
    now: DateTime<Utc>,
) -> DuplicateVerdict {
    // One or two characters are not enough to call something a duplicate.
    if message.trim().chars().count() <= 2 {
        return DuplicateVerdict::Allow;
    }

    let normalized = normalize(message);
    if normalized.chars().count() <= 1 {
        return DuplicateVerdict::Allow;
    }

    if state.is_on_cooldown(&normalized, now) {
        return DuplicateVerdict::CooldownActive;
    }

    // Oldest-first scan; the first sufficiently similar entry decides and
    // later entries are never consulted. Short history entries are skipped.
    let matched = state.history().any(|past| {
        past.trim().chars().count() > 2
            && similarity(&normalized, &normalize(past)) >= similarity_threshold
    });

    if matched {
        let count = state.increment_repeat(&normalized);
        if count >= max_repeats {
            state.set_cooldown(&normalized, now + Duration::seconds(cooldown_seconds as i64));
            state.reset_repeat(&normalized);
            return DuplicateVerdict::RepeatLimit;
        }
        // Under the limit: let it through, keep the counter running.
        return DuplicateVerdict::Allow;
    }

    // No history entry matched: progress toward the repeat limit for this
    // content is dropped.
    state.reset_repeat(&normalized);
    DuplicateVerdict::Allow
}
