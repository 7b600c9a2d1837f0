//! Checkpoint error types.

use crate::core::CatalogId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Could not encode checkpoint: {0}")]
    Encode(String),

    #[error("Could not decode checkpoint: {0}")]
    Decode(String),

    #[error("Checkpoint format {found} cannot be read (this build reads {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint was taken from a machine over another catalog.
    #[error("Checkpoint belongs to catalog '{found}', machine runs '{expected}'")]
    CatalogMismatch { expected: CatalogId, found: CatalogId },

    /// Recorded leaf path does not exist in the machine's catalog.
    #[error("Checkpoint position '{}' is not a state of this machine", .0.join("."))]
    UnknownPosition(Vec<String>),
}
