use super::mute_models::MuteRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MuteStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for mute records.
///
/// Implementations return every record they can read - expiry filtering
/// happens in the service. Individual malformed keys or records must be
/// skipped with a warning, never turned into an error for the whole load.
#[async_trait]
pub trait MuteStore: Send + Sync {
    async fn load(&self) -> Result<HashMap<Uuid, MuteRecord>, MuteStoreError>;
    async fn save(&self, mutes: &HashMap<Uuid, MuteRecord>) -> Result<(), MuteStoreError>;
}
