// Per-sender ephemeral tracking state. One of these lives in the engine's
// sharded map for every identity that has sent a message since the last
// reload. Nothing here survives a restart.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

pub struct SenderState {
    /// Last N accepted raw messages, oldest first.
    history: VecDeque<String>,
    max_history: usize,
    /// Normalized text -> cooldown expiry. Expired entries are removed
    /// lazily by the lookup that finds them.
    cooldowns: HashMap<String, DateTime<Utc>>,
    /// Normalized text -> consecutive near-duplicate count.
    repeat_counts: HashMap<String, u32>,
    /// Arrival instants for burst detection, pruned to the window on check.
    recent_timestamps: Vec<DateTime<Utc>>,
}

impl SenderState {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::new(),
            max_history,
            cooldowns: HashMap::new(),
            repeat_counts: HashMap::new(),
            recent_timestamps: Vec::new(),
        }
    }

    /// Record an accepted message, evicting the oldest past the cap.
    pub fn push_message(&mut self, message: &str) {
        self.history.push_back(message.to_string());
        if self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Accepted messages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().map(String::as_str)
    }

    pub fn set_cooldown(&mut self, normalized: &str, expiry: DateTime<Utc>) {
        self.cooldowns.insert(normalized.to_string(), expiry);
    }

    /// Check-then-evict: a lookup that finds an expired entry deletes it
    /// and reports the content as not on cooldown.
    pub fn is_on_cooldown(&mut self, normalized: &str, now: DateTime<Utc>) -> bool {
        match self.cooldowns.get(normalized) {
            Some(expiry) if now >= *expiry => {
                self.cooldowns.remove(normalized);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Bump the consecutive-repeat counter for this content, returning the
    /// new count.
    pub fn increment_repeat(&mut self, normalized: &str) -> u32 {
        let count = self.repeat_counts.entry(normalized.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn reset_repeat(&mut self, normalized: &str) {
        self.repeat_counts.remove(normalized);
    }

    pub fn repeat_count(&self, normalized: &str) -> u32 {
        self.repeat_counts.get(normalized).copied().unwrap_or(0)
    }

    pub fn record_timestamp(&mut self, at: DateTime<Utc>) {
        self.recent_timestamps.push(at);
    }

    /// Drop arrival instants older than the cutoff.
    pub fn prune_timestamps(&mut self, cutoff: DateTime<Utc>) {
        self.recent_timestamps.retain(|t| *t >= cutoff);
    }

    pub fn recent_message_count(&self) -> usize {
        self.recent_timestamps.len()
    }
}
