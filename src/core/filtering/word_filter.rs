// Blocked-word matching. Catches the word itself, embedded occurrences,
// leetspeak and spaced-out variations ("sp4m", "s-p-a-m"), and tokens that
// contain or are contained by the blocked word.

use super::normalizer::normalize;
use super::similarity::similarity;

/// Whole-string similarity at or above this percentage counts as a match.
const SIMILARITY_CUTOFF: f64 = 80.0;

/// True when the message matches any of the blocked words.
///
/// Messages of one or two trimmed characters are never blocked, and tokens
/// that short are never compared - both guards exist to avoid false
/// positives on short utterances. The first matching word wins.
pub fn contains_blocked_word(message: &str, blocked_words: &[String]) -> bool {
    if message.trim().chars().count() <= 2 {
        return false;
    }

    let normalized = normalize(message);

    for blocked in blocked_words {
        let normalized_blocked = normalize(blocked);

        // The blocked word appears somewhere in the normalized message.
        if normalized.contains(normalized_blocked.as_str()) {
            return true;
        }

        // Whole-message variation of the word ("spaam", "spm").
        if similarity(&normalized, &normalized_blocked) >= SIMILARITY_CUTOFF {
            return true;
        }

        // Token-level overlap against the original spelling: a token that
        // contains the blocked word, or sits inside it, is a match.
        for word in message.to_lowercase().split_whitespace() {
            if word.trim().chars().count() <= 2 {
                continue;
            }

            let normalized_word = normalize(word);
            if normalized_word.contains(normalized_blocked.as_str())
                || normalized_blocked.contains(normalized_word.as_str())
            {
                return true;
            }
        }
    }

    false
}
