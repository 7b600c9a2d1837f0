//! Configuration violations detected while validating a catalog.

use crate::core::{CatalogId, StateRef};
use std::fmt;
use thiserror::Error;

/// Deepest nesting accepted when walking parent links.
pub const MAX_DEPTH: usize = 100;

/// Which kind of reference named an unresolvable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Next,
    Option,
    Optional,
    PrevOverride,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Next => "next",
            Self::Option => "option",
            Self::Optional => "optional",
            Self::PrevOverride => "previous-override",
        })
    }
}

/// A single configuration defect in a catalog or engine setup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Catalog '{catalog}' has no initial state")]
    MissingInitialState { catalog: CatalogId },

    #[error("Catalog '{catalog}' has several initial states: {}", .states.join(", "))]
    MultipleInitialStates {
        catalog: CatalogId,
        states: Vec<String>,
    },

    #[error("Catalog '{catalog}' declares state '{name}' more than once")]
    DuplicateState { catalog: CatalogId, name: String },

    #[error("Final state '{state}' declares transitions")]
    FinalWithTransitions { state: StateRef },

    #[error("State '{state}' refers to unknown {kind} target '{target}'")]
    UnresolvedTarget {
        state: StateRef,
        target: String,
        kind: EdgeKind,
    },

    #[error("State '{state}' sets previous to '{target}', which is outside its own catalog")]
    PrevOverrideOutOfScope { state: StateRef, target: String },

    #[error("State '{state}' lists '{target}' both as next and as optional target")]
    OptionalDuplicatesNext { state: StateRef, target: String },

    #[error("State '{state}' jumps to '{target}' but the engine has no '{event}' trigger")]
    MissingTrigger {
        state: StateRef,
        target: String,
        event: String,
    },

    #[error("State '{state}' is nested {depth} levels deep (limit {limit})")]
    MalformedHierarchy {
        state: StateRef,
        depth: usize,
        limit: usize,
    },
}

impl ConfigError {
    /// The state the violation was found on, when it concerns one state.
    pub fn state(&self) -> Option<&StateRef> {
        match self {
            Self::MissingInitialState { .. }
            | Self::MultipleInitialStates { .. }
            | Self::DuplicateState { .. } => None,
            Self::FinalWithTransitions { state }
            | Self::UnresolvedTarget { state, .. }
            | Self::PrevOverrideOutOfScope { state, .. }
            | Self::OptionalDuplicatesNext { state, .. }
            | Self::MissingTrigger { state, .. }
            | Self::MalformedHierarchy { state, .. } => Some(state),
        }
    }
}
