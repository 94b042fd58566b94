// JSON-file mute store. All records sit under a top-level `mutes` map
// keyed by sender UUID:
//
//   { "mutes": { "<uuid>": { "expiry": 1704110400, "duration": 300 } } }
//
// Records are decoded one at a time so a single malformed key or value is
// skipped with a warning instead of aborting the whole load.

use crate::core::mutes::{MuteRecord, MuteStore, MuteStoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MuteFile {
    mutes: HashMap<String, serde_json::Value>,
}

pub struct JsonMuteStore {
    path: PathBuf,
}

impl JsonMuteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MuteStore for JsonMuteStore {
    async fn load(&self) -> Result<HashMap<Uuid, MuteRecord>, MuteStoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let file = std::fs::File::open(&self.path)?;
        let parsed: MuteFile = serde_json::from_reader(file)?;

        let mut mutes = HashMap::with_capacity(parsed.mutes.len());
        for (key, value) in parsed.mutes {
            let id = match Uuid::parse_str(&key) {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(%key, "invalid sender id in mute file, skipping");
                    continue;
                }
            };
            match serde_json::from_value::<MuteRecord>(value) {
                Ok(record) => {
                    mutes.insert(id, record);
                }
                Err(e) => tracing::warn!(%key, "invalid mute record, skipping: {e}"),
            }
        }
        Ok(mutes)
    }

    async fn save(&self, mutes: &HashMap<Uuid, MuteRecord>) -> Result<(), MuteStoreError> {
        let mut file = MuteFile {
            mutes: HashMap::with_capacity(mutes.len()),
        };
        for (id, record) in mutes {
            file.mutes
                .insert(id.to_string(), serde_json::to_value(record)?);
        }

        let out = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(out, &file)?;
        Ok(())
    }
}
