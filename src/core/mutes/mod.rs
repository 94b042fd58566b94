// Core mutes module - persistent timed mutes and kick escalation.
// Following the same pattern as the moderation module.

pub mod mute_models;
pub mod mute_service;
pub mod mute_store;

pub use mute_models::*;
pub use mute_service::*;
pub use mute_store::*;
