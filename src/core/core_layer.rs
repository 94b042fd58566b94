// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "filtering/mod.rs"]
pub mod filtering;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "mutes/mod.rs"]
pub mod mutes;
