// Moderation domain models - verdicts, requested actions and engine
// configuration.
//
// These are pure domain types with no transport dependencies. The host
// converts verdicts and actions into whatever its platform does (drop the
// packet, disconnect the session, ...).

use serde::{Deserialize, Serialize};

/// Why a message was suppressed.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReason {
    /// Sender is muted; `seconds_remaining` is how long the mute still runs
    Muted { seconds_remaining: u64 },
    /// Sender exceeded the burst threshold inside the window
    SpamBurst,
    /// Message matched the blocked-word list
    BlockedWord,
    /// Near-duplicate content still on cooldown from an earlier repeat limit
    DuplicateCooldown,
    /// Near-duplicate repeated past the limit; a cooldown was just started
    DuplicateRepeatLimit,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::Muted { seconds_remaining } => {
                write!(f, "muted ({seconds_remaining}s remaining)")
            }
            BlockReason::SpamBurst => write!(f, "spam burst"),
            BlockReason::BlockedWord => write!(f, "blocked word"),
            BlockReason::DuplicateCooldown => write!(f, "duplicate (cooldown)"),
            BlockReason::DuplicateRepeatLimit => write!(f, "duplicate (repeat limit)"),
        }
    }
}

/// Decision for a single inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Deliver the message
    Allowed,
    /// Suppress the message
    Blocked(BlockReason),
}

/// Side effect the host should carry out alongside the verdict.
/// The engine only signals; it never disconnects anyone itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModAction {
    None,
    /// Disconnect the sender (burst spam)
    Kick,
}

/// Result of running one message through the moderation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub verdict: Verdict,
    pub action: ModAction,
}

impl CheckResult {
    /// Create an "allowed" result
    pub fn allowed() -> Self {
        Self {
            verdict: Verdict::Allowed,
            action: ModAction::None,
        }
    }

    /// Create a blocked result with no requested action
    pub fn blocked(reason: BlockReason) -> Self {
        Self {
            verdict: Verdict::Blocked(reason),
            action: ModAction::None,
        }
    }

    /// Create a blocked result with a requested action
    pub fn blocked_with(reason: BlockReason, action: ModAction) -> Self {
        Self {
            verdict: Verdict::Blocked(reason),
            action,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allowed
    }
}

/// Configuration for the whole moderation pipeline.
///
/// The host owns loading this (file, database, env); the engine only reads
/// it and swaps it atomically on `reload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// How many accepted messages to keep per sender for duplicate checks
    pub message_history_size: usize,
    /// Similarity percentage at which two messages count as near-duplicates
    pub similarity_threshold: f64,
    /// Similar messages tolerated before the content goes on cooldown
    pub max_repeats: u32,
    /// How long repeated content stays blocked, in seconds
    pub cooldown_seconds: u64,
    pub blocked_words: BlockedWordsConfig,
    pub burst: BurstConfig,
    pub auto_mute: AutoMuteConfig,
    /// Whether muted senders may still receive private messages
    pub muted_may_receive_pm: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            message_history_size: 10,
            similarity_threshold: 75.0, // percent
            max_repeats: 2,
            cooldown_seconds: 30,
            blocked_words: BlockedWordsConfig::default(),
            burst: BurstConfig::default(),
            auto_mute: AutoMuteConfig::default(),
            muted_may_receive_pm: true,
        }
    }
}

/// Blocked-word filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedWordsConfig {
    pub enabled: bool,
    pub word_list: Vec<String>,
}

impl Default for BlockedWordsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            word_list: Vec::new(),
        }
    }
}

/// Burst (message flood) detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    pub enabled: bool,
    /// Messages allowed inside the window before the sender is kicked
    pub message_threshold: u32,
    /// Sliding window length in seconds
    pub window_seconds: u64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message_threshold: 7, // 7 messages...
            window_seconds: 5,    // ...in 5 seconds
        }
    }
}

/// Kick-to-mute escalation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoMuteConfig {
    pub enabled: bool,
    /// Burst kicks inside the window before an automatic mute
    pub kick_threshold: u32,
    /// Escalation window length in minutes
    pub kick_window_minutes: u64,
    /// Length of the issued mute in seconds
    pub mute_duration_seconds: u64,
}

impl Default for AutoMuteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kick_threshold: 3,          // 3 kicks...
            kick_window_minutes: 10,    // ...in 10 minutes
            mute_duration_seconds: 300, // 5 minute mute
        }
    }
}
