// Chat moderation engine.
//
// **Architecture Overview:**
// - `core/` = Business logic (transport-agnostic)
// - `infra/` = Implementations of core traits (file-backed storage)
//
// A host (game server plugin, chat gateway, bot) feeds every inbound
// message through `ModerationEngine::check_message` together with the
// sender's identity and the current instant, then applies the returned
// verdict and action. The engine never delivers messages or disconnects
// anyone itself - it only decides.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub use crate::core::moderation::{
    BlockReason, CheckResult, ModAction, ModerationConfig, ModerationEngine, Verdict,
};
pub use crate::core::mutes::{MuteRecord, MuteService, MuteStore, MuteStoreError};
pub use crate::infra::mutes::JsonMuteStore;
