// Core moderation module - the decision pipeline and its state machines.
// Following the same layout as the mutes module.

pub mod duplicate_detector;
pub mod moderation_models;
pub mod moderation_service;
pub mod rate_limiter;
pub mod sender_state;

pub use duplicate_detector::DuplicateVerdict;
pub use moderation_models::*;
pub use moderation_service::*;
pub use sender_state::SenderState;
