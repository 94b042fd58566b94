// Mute domain model. Serialized as-is into the mute file, so the field
// shapes here are the persistence format: expiry as unix seconds plus the
// originally requested duration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A timed mute for one sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteRecord {
    /// Absolute instant the mute lapses
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expiry: DateTime<Utc>,
    /// Requested length in seconds, kept for persistence and audit rather
    /// than recomputed from `expiry`
    pub duration: u64,
}

impl MuteRecord {
    pub fn new(duration_secs: u64, now: DateTime<Utc>) -> Self {
        Self {
            expiry: now + Duration::seconds(duration_secs as i64),
            duration: duration_secs,
        }
    }

    /// A record at or past its expiry is logically absent; every read path
    /// treats it that way.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> u64 {
        (self.expiry - now).num_seconds().max(0) as u64
    }
}
