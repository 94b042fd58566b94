// Moderation engine - the single decision entry point.
//
// Pipeline order is fixed: mute gate -> burst rate limit -> blocked words
// -> duplicate detection. The first blocking check wins; a message that
// clears every check is recorded into the sender's history and allowed.
//
// Per-sender state lives in a DashMap, so operations on one sender are
// serialized by its shard while unrelated senders proceed in parallel.
// Entry guards are never held across an await.

use super::duplicate_detector::{self, DuplicateVerdict};
use super::moderation_models::{BlockReason, CheckResult, ModAction, ModerationConfig};
use super::rate_limiter;
use super::sender_state::SenderState;
use crate::core::filtering::word_filter;
use crate::core::mutes::{MuteService, MuteStore};
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ModerationEngine<S: MuteStore> {
    /// Arc so the per-message snapshot is a pointer clone, not a copy of
    /// the whole config (word list included).
    config: RwLock<Arc<ModerationConfig>>,
    senders: DashMap<Uuid, SenderState>,
    mutes: MuteService<S>,
}

impl<S: MuteStore> ModerationEngine<S> {
    pub fn new(config: ModerationConfig, store: S) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            senders: DashMap::new(),
            mutes: MuteService::new(store),
        }
    }

    /// Load persisted mutes. Call once after construction.
    pub async fn load(&self, now: DateTime<Utc>) {
        self.mutes.load(now).await;
    }

    /// Run one inbound message through the pipeline and decide its fate.
    ///
    /// Never fails: ambiguous or too-short input degrades to `Allowed`,
    /// and persistence problems stay internal to the mute service.
    pub async fn check_message(
        &self,
        sender: Uuid,
        message: &str,
        now: DateTime<Utc>,
    ) -> CheckResult {
        let config = self.config.read().await.clone();

        // Mute gate.
        if self.mutes.is_muted(sender, now).await {
            let seconds_remaining = self.mutes.seconds_remaining(sender, now);
            tracing::debug!(%sender, seconds_remaining, "blocked (muted)");
            return CheckResult::blocked(BlockReason::Muted { seconds_remaining });
        }

        // Burst rate limit. The arrival is recorded here even when a later
        // check ends up blocking the message.
        if config.burst.enabled {
            let burst = {
                let mut state = self.sender_state(sender, &config);
                rate_limiter::check_burst(
                    &mut state,
                    now,
                    config.burst.window_seconds,
                    config.burst.message_threshold,
                )
            };
            if burst {
                self.mutes
                    .record_spam_kick(sender, now, &config.auto_mute)
                    .await;
                tracing::debug!(%sender, "blocked (spam burst), kick requested");
                return CheckResult::blocked_with(BlockReason::SpamBurst, ModAction::Kick);
            }
        }

        // Blocked words.
        if config.blocked_words.enabled
            && word_filter::contains_blocked_word(message, &config.blocked_words.word_list)
        {
            tracing::debug!(%sender, "blocked (blocked word)");
            return CheckResult::blocked(BlockReason::BlockedWord);
        }

        // Duplicates.
        let verdict = {
            let mut state = self.sender_state(sender, &config);
            duplicate_detector::check(
                &mut state,
                message,
                config.similarity_threshold,
                config.max_repeats,
                config.cooldown_seconds,
                now,
            )
        };
        match verdict {
            DuplicateVerdict::CooldownActive => {
                tracing::debug!(%sender, "blocked (duplicate cooldown)");
                return CheckResult::blocked(BlockReason::DuplicateCooldown);
            }
            DuplicateVerdict::RepeatLimit => {
                tracing::debug!(%sender, "blocked (duplicate repeat limit)");
                return CheckResult::blocked(BlockReason::DuplicateRepeatLimit);
            }
            DuplicateVerdict::Allow => {}
        }

        // Accepted: only now does the message enter the history.
        self.sender_state(sender, &config).push_message(message);
        tracing::debug!(%sender, "allowed");
        CheckResult::allowed()
    }

    /// Whether a private message may be delivered *to* this recipient.
    /// False only when the recipient is muted and the config says muted
    /// senders do not receive PMs.
    pub async fn can_receive_private(&self, recipient: Uuid, now: DateTime<Utc>) -> bool {
        if !self.mutes.is_muted(recipient, now).await {
            return true;
        }
        self.config.read().await.muted_may_receive_pm
    }

    // Mute administration passthroughs (host commands).

    pub async fn mute(&self, sender: Uuid, duration_secs: u64, now: DateTime<Utc>) {
        self.mutes.mute(sender, duration_secs, now).await;
    }

    pub async fn unmute(&self, sender: Uuid) {
        self.mutes.unmute(sender).await;
    }

    pub async fn is_muted(&self, sender: Uuid, now: DateTime<Utc>) -> bool {
        self.mutes.is_muted(sender, now).await
    }

    pub fn mute_seconds_remaining(&self, sender: Uuid, now: DateTime<Utc>) -> u64 {
        self.mutes.seconds_remaining(sender, now)
    }

    /// Periodic sweep of expired mutes and stale kick history. The host is
    /// responsible for invoking this on a timer.
    pub async fn cleanup(&self, now: DateTime<Utc>) {
        let kick_window = self.config.read().await.auto_mute.kick_window_minutes;
        self.mutes.cleanup(now, kick_window).await;
    }

    /// Swap in a new config and drop all ephemeral per-sender state.
    /// Persisted mutes survive a reload.
    pub async fn reload(&self, config: ModerationConfig) {
        *self.config.write().await = Arc::new(config);
        self.senders.clear();
        tracing::info!("moderation engine reloaded");
    }

    /// Drop everything, mutes included (full reconfiguration).
    pub fn clear_all(&self) {
        self.senders.clear();
        self.mutes.clear_all();
    }

    /// Forget one sender's ephemeral state (e.g. on disconnect).
    pub fn remove_sender(&self, sender: Uuid) {
        self.senders.remove(&sender);
    }

    pub async fn config(&self) -> ModerationConfig {
        self.config.read().await.as_ref().clone()
    }

    fn sender_state(
        &self,
        sender: Uuid,
        config: &ModerationConfig,
    ) -> RefMut<'_, Uuid, SenderState> {
        self.senders
            .entry(sender)
            .or_insert_with(|| SenderState::new(config.message_history_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::moderation_models::{
        AutoMuteConfig, BlockedWordsConfig, BurstConfig, Verdict,
    };
    use crate::core::mutes::{MuteRecord, MuteStoreError};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    /// Store that never has anything and forgets every save.
    struct NullMuteStore;

    #[async_trait]
    impl MuteStore for NullMuteStore {
        async fn load(&self) -> Result<HashMap<Uuid, MuteRecord>, MuteStoreError> {
            Ok(HashMap::new())
        }

        async fn save(&self, _mutes: &HashMap<Uuid, MuteRecord>) -> Result<(), MuteStoreError> {
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn engine(config: ModerationConfig) -> ModerationEngine<NullMuteStore> {
        ModerationEngine::new(config, NullMuteStore)
    }

    fn config_without_burst() -> ModerationConfig {
        ModerationConfig {
            burst: BurstConfig {
                enabled: false,
                ..BurstConfig::default()
            },
            ..ModerationConfig::default()
        }
    }

    #[tokio::test]
    async fn clean_message_is_allowed() {
        let engine = engine(ModerationConfig::default());
        let sender = Uuid::new_v4();

        let result = engine.check_message(sender, "hello world", t0()).await;
        assert!(result.is_allowed());
        assert_eq!(result.action, ModAction::None);
    }

    #[tokio::test]
    async fn repeat_limit_blocks_third_similar_message() {
        let engine = engine(config_without_burst());
        let sender = Uuid::new_v4();

        assert!(engine
            .check_message(sender, "buy gold here", t0())
            .await
            .is_allowed());
        assert!(engine
            .check_message(sender, "buy g0ld here", t0() + Duration::seconds(1))
            .await
            .is_allowed());

        let result = engine
            .check_message(sender, "buy gold here", t0() + Duration::seconds(2))
            .await;
        assert_eq!(
            result.verdict,
            Verdict::Blocked(BlockReason::DuplicateRepeatLimit)
        );

        // Identically-normalizing content now sits on cooldown.
        let result = engine
            .check_message(sender, "buy gold here", t0() + Duration::seconds(10))
            .await;
        assert_eq!(
            result.verdict,
            Verdict::Blocked(BlockReason::DuplicateCooldown)
        );
    }

    #[tokio::test]
    async fn blocked_word_is_caught_in_variations() {
        let mut config = config_without_burst();
        config.blocked_words = BlockedWordsConfig {
            enabled: true,
            word_list: vec!["spam".to_string()],
        };
        let engine = engine(config);
        let sender = Uuid::new_v4();

        for message in ["sp4m", "s-p-a-m", "free spam for all"] {
            let result = engine.check_message(sender, message, t0()).await;
            assert_eq!(
                result.verdict,
                Verdict::Blocked(BlockReason::BlockedWord),
                "{message:?} should be blocked"
            );
        }

        assert!(engine.check_message(sender, "hi", t0()).await.is_allowed());
    }

    #[tokio::test]
    async fn burst_triggers_kick_and_escalates_to_mute() {
        let config = ModerationConfig {
            burst: BurstConfig {
                enabled: true,
                message_threshold: 3,
                window_seconds: 5,
            },
            auto_mute: AutoMuteConfig {
                enabled: true,
                kick_threshold: 1,
                kick_window_minutes: 10,
                mute_duration_seconds: 300,
            },
            ..ModerationConfig::default()
        };
        let engine = engine(config);
        let sender = Uuid::new_v4();

        for i in 0..3 {
            let result = engine
                .check_message(sender, &format!("message {i}"), t0())
                .await;
            assert!(result.is_allowed(), "message {i} should pass");
        }

        // Fourth message inside the window: burst, kick, immediate mute
        // (threshold 1).
        let result = engine.check_message(sender, "message 3", t0()).await;
        assert_eq!(result.verdict, Verdict::Blocked(BlockReason::SpamBurst));
        assert_eq!(result.action, ModAction::Kick);
        assert!(engine.is_muted(sender, t0()).await);

        // And the mute gate now fronts the pipeline.
        let result = engine
            .check_message(sender, "hello again", t0() + Duration::seconds(1))
            .await;
        assert!(matches!(
            result.verdict,
            Verdict::Blocked(BlockReason::Muted { .. })
        ));
    }

    #[tokio::test]
    async fn muted_sender_is_blocked_with_time_remaining() {
        let engine = engine(config_without_burst());
        let sender = Uuid::new_v4();

        engine.mute(sender, 120, t0()).await;

        let result = engine
            .check_message(sender, "hello", t0() + Duration::seconds(20))
            .await;
        assert_eq!(
            result.verdict,
            Verdict::Blocked(BlockReason::Muted {
                seconds_remaining: 100
            })
        );

        // Expired mute stops blocking without any cleanup call.
        let result = engine
            .check_message(sender, "hello", t0() + Duration::seconds(121))
            .await;
        assert!(result.is_allowed());
    }

    #[tokio::test]
    async fn reload_drops_duplicate_state_but_keeps_mutes() {
        let engine = engine(config_without_burst());
        let spammer = Uuid::new_v4();
        let muted = Uuid::new_v4();

        engine.mute(muted, 600, t0()).await;
        assert!(engine
            .check_message(spammer, "same old line", t0())
            .await
            .is_allowed());
        assert!(engine
            .check_message(spammer, "same old line", t0())
            .await
            .is_allowed());

        engine.reload(config_without_burst()).await;

        // Duplicate progress gone: the same line is occurrence one again.
        assert!(engine
            .check_message(spammer, "same old line", t0())
            .await
            .is_allowed());
        // The mute is still in force.
        assert!(engine.is_muted(muted, t0()).await);
    }

    #[tokio::test]
    async fn clear_all_drops_mutes_too() {
        let engine = engine(config_without_burst());
        let sender = Uuid::new_v4();

        engine.mute(sender, 600, t0()).await;
        engine.clear_all();
        assert!(!engine.is_muted(sender, t0()).await);
    }

    #[tokio::test]
    async fn pm_delivery_honors_muted_receive_flag() {
        let mut config = config_without_burst();
        config.muted_may_receive_pm = false;
        let engine = engine(config);
        let recipient = Uuid::new_v4();

        assert!(engine.can_receive_private(recipient, t0()).await);

        engine.mute(recipient, 600, t0()).await;
        assert!(!engine.can_receive_private(recipient, t0()).await);

        let mut config = config_without_burst();
        config.muted_may_receive_pm = true;
        engine.reload(config).await;
        assert!(engine.can_receive_private(recipient, t0()).await);
    }

    #[tokio::test]
    async fn cleanup_sweeps_expired_mute() {
        let engine = engine(config_without_burst());
        let sender = Uuid::new_v4();

        engine.mute(sender, 30, t0()).await;
        engine.cleanup(t0() + Duration::seconds(31)).await;
        assert_eq!(engine.mute_seconds_remaining(sender, t0()), 0);
    }

    #[tokio::test]
    async fn senders_do_not_share_duplicate_state() {
        let engine = engine(config_without_burst());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(engine.check_message(a, "hello there", t0()).await.is_allowed());
        assert!(engine.check_message(a, "hello there", t0()).await.is_allowed());
        assert_eq!(
            engine.check_message(a, "hello there", t0()).await.verdict,
            Verdict::Blocked(BlockReason::DuplicateRepeatLimit)
        );

        // A different sender saying the same thing starts from zero.
        assert!(engine.check_message(b, "hello there", t0()).await.is_allowed());
    }

    #[tokio::test]
    async fn remove_sender_forgets_history() {
        let engine = engine(config_without_burst());
        let sender = Uuid::new_v4();

        assert!(engine.check_message(sender, "hello there", t0()).await.is_allowed());
        assert!(engine.check_message(sender, "hello there", t0()).await.is_allowed());

        engine.remove_sender(sender);

        // Fresh state: occurrence one again instead of the repeat limit.
        assert!(engine.check_message(sender, "hello there", t0()).await.is_allowed());
    }
}
