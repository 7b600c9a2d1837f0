//! Checkpoint and resume for engines.
//!
//! A checkpoint captures where a machine stands (the names from the root
//! down to the active leaf) plus its transition history. Hooks and
//! observers are not serializable and are not part of it: resuming happens
//! on a freshly built engine over the same catalog, through a relocation.

use crate::core::{CatalogId, StateHistory};
use crate::engine::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Format version written into every checkpoint.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Identity of the root catalog the machine runs
    pub catalog: CatalogId,

    /// State names from the root catalog down to the active leaf
    pub position: Vec<String>,

    /// Complete transition history
    pub history: StateHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Decode(e.to_string()))
    }

    /// Compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::Decode(e.to_string()))
    }
}

impl Engine {
    /// Capture the active leaf and the history.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            catalog: self.catalog().id().clone(),
            position: self.current_path_names(),
            history: self.history().clone(),
        }
    }

    /// Move this engine to the position recorded in `checkpoint`.
    ///
    /// The engine adopts the recorded history and relocates to the recorded
    /// leaf (entered notifications fire, exited ones do not), so the history
    /// ends with the relocation. Whether the machine runs afterwards follows
    /// from the leaf: a top-level final state finishes it again.
    pub fn resume(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if &checkpoint.catalog != self.catalog().id() {
            return Err(CheckpointError::CatalogMismatch {
                expected: self.catalog().id().clone(),
                found: checkpoint.catalog.clone(),
            });
        }

        let path: Vec<&str> = checkpoint.position.iter().map(String::as_str).collect();
        if self.find(&path).is_none() {
            return Err(CheckpointError::UnknownPosition(checkpoint.position.clone()));
        }
        self.set_history(checkpoint.history.clone());
        self.relocate_path(&path)
            .map_err(|_| CheckpointError::UnknownPosition(checkpoint.position.clone()))?;
        info!(
            checkpoint = %checkpoint.id,
            state = %self.current_state_ref(),
            "resumed from checkpoint"
        );
        Ok(())
    }
}
