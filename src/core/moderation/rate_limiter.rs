// Sliding-window burst detection over a sender's recent arrival instants.

use super::sender_state::SenderState;
use chrono::{DateTime, Duration, Utc};

/// Record an arrival and report whether it pushed the sender over the
/// burst threshold for the window.
///
/// The arrival is recorded unconditionally - a message blocked further
/// down the pipeline still counts toward the sender's rate.
pub fn check_burst(
    state: &mut SenderState,
    now: DateTime<Utc>,
    window_seconds: u64,
    threshold: u32,
) -> bool {
    let cutoff = now - Duration::seconds(window_seconds as i64);
    state.prune_timestamps(cutoff);
    state.record_timestamp(now);

    state.recent_message_count() > threshold as usize
}
