// Mute lifecycle: timed mutes backed by a write-through in-memory map,
// plus the escalation path that converts repeated burst kicks into an
// automatic mute.
//
// The in-memory map is authoritative for the running process; persistence
// failures are logged and swallowed (losing mutes across a crash is the
// accepted tradeoff, not an error surfaced to callers).

use super::mute_models::MuteRecord;
use super::mute_store::MuteStore;
use crate::core::moderation::AutoMuteConfig;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

pub struct MuteService<S: MuteStore> {
    store: S,
    /// Active mutes, keyed by sender identity.
    active: DashMap<Uuid, MuteRecord>,
    /// Burst-kick instants per sender, pruned to the escalation window.
    recent_kicks: DashMap<Uuid, Vec<DateTime<Utc>>>,
}

impl<S: MuteStore> MuteService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            active: DashMap::new(),
            recent_kicks: DashMap::new(),
        }
    }

    /// Load persisted mutes, dropping any that expired while the process
    /// was down. A load failure leaves the (empty) in-memory state in
    /// charge rather than failing the caller.
    pub async fn load(&self, now: DateTime<Utc>) {
        match self.store.load().await {
            Ok(records) => {
                self.active.clear();
                for (id, record) in records {
                    if record.is_expired(now) {
                        continue;
                    }
                    tracing::debug!(
                        %id,
                        remaining = record.seconds_remaining(now),
                        "loaded active mute"
                    );
                    self.active.insert(id, record);
                }
                tracing::info!(count = self.active.len(), "loaded active mutes");
            }
            Err(e) => tracing::warn!("failed to load mutes: {e}"),
        }
    }

    /// Check-then-evict: reading an expired record removes it and persists
    /// the removal, exactly like an explicit unmute.
    pub async fn is_muted(&self, id: Uuid, now: DateTime<Utc>) -> bool {
        let expired = match self.active.get(&id) {
            None => return false,
            Some(record) => record.is_expired(now),
        };

        if expired {
            self.unmute(id).await;
            return false;
        }
        true
    }

    /// Remaining mute time in whole seconds; 0 for absent or expired.
    ///
    /// An expired record is reported as absent but left in place - this
    /// path stays synchronous, and eviction (with its persist) happens on
    /// the next `is_muted` read or `cleanup` sweep.
    pub fn seconds_remaining(&self, id: Uuid, now: DateTime<Utc>) -> u64 {
        self.active
            .get(&id)
            .map(|record| record.seconds_remaining(now))
            .unwrap_or(0)
    }

    /// Mute a sender, overwriting any existing record, and persist.
    pub async fn mute(&self, id: Uuid, duration_secs: u64, now: DateTime<Utc>) {
        self.active.insert(id, MuteRecord::new(duration_secs, now));
        self.persist().await;
        tracing::info!(%id, duration_secs, "muted sender");
    }

    pub async fn unmute(&self, id: Uuid) {
        self.active.remove(&id);
        self.persist().await;
        tracing::debug!(%id, "unmuted sender");
    }

    /// Record a burst kick and escalate when the sender has collected
    /// enough of them inside the window. Returns true when an automatic
    /// mute was issued; the kick history is cleared at that point so the
    /// next escalation starts from zero.
    pub async fn record_spam_kick(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        config: &AutoMuteConfig,
    ) -> bool {
        if !config.enabled {
            return false;
        }

        let cutoff = now - Duration::minutes(config.kick_window_minutes as i64);
        let escalate = {
            let mut kicks = self.recent_kicks.entry(id).or_default();
            kicks.retain(|t| *t >= cutoff);
            kicks.push(now);

            if kicks.len() >= config.kick_threshold as usize {
                kicks.clear();
                true
            } else {
                tracing::debug!(
                    %id,
                    count = kicks.len(),
                    threshold = config.kick_threshold,
                    "recorded spam kick"
                );
                false
            }
        };

        if escalate {
            self.mute(id, config.mute_duration_seconds, now).await;
            tracing::info!(
                %id,
                duration_secs = config.mute_duration_seconds,
                "auto-muted sender after repeated spam kicks"
            );
        }
        escalate
    }

    /// Bulk sweep: drop expired mutes and stale kick history. Driven by a
    /// host timer; safe to race with per-message operations because it
    /// only removes entries that are already expired or empty.
    pub async fn cleanup(&self, now: DateTime<Utc>, kick_window_minutes: u64) {
        let before = self.active.len();
        self.active.retain(|_, record| !record.is_expired(now));

        let cutoff = now - Duration::minutes(kick_window_minutes as i64);
        self.recent_kicks.retain(|_, kicks| {
            kicks.retain(|t| *t >= cutoff);
            !kicks.is_empty()
        });

        if self.active.len() != before {
            self.persist().await;
        }
    }

    /// Drop all in-memory mutes and kick history (full reconfiguration).
    /// The backing store is left alone; the next mutation overwrites it.
    pub fn clear_all(&self) {
        self.active.clear();
        self.recent_kicks.clear();
    }

    async fn persist(&self) {
        let snapshot: HashMap<Uuid, MuteRecord> = self
            .active
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        if let Err(e) = self.store.save(&snapshot).await {
            tracing::warn!("failed to save mutes: {e}");
        }
    }
}
