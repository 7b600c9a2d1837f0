//! Transition history tracking.
//!
//! Records every transition and relocation the engine performs. `record`
//! returns a new history and leaves the old one alone; the engine appends in
//! place with `push`.

use super::id::StateRef;
use super::trigger::Trigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why the machine moved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// A wired edge fired for this trigger.
    Trigger(Trigger),
    /// Out-of-band relocation; not a declared edge.
    Relocate,
}

/// Record of a single move between leaf states.
///
/// # Example
///
/// ```rust
/// use statechart::core::{CatalogId, StateRef, StateTransition, TransitionCause};
/// use statechart::Trigger;
/// use chrono::Utc;
///
/// let main = CatalogId::new("Main", 0);
/// let transition = StateTransition {
///     from: StateRef::new(main.clone(), "IDLE"),
///     to: StateRef::new(main, "RUNNING"),
///     cause: TransitionCause::Trigger(Trigger::Next),
///     timestamp: Utc::now(),
/// };
/// assert!(!transition.is_discontinuous());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateTransition {
    /// Leaf active before the move
    pub from: StateRef,
    /// Leaf active after the move
    pub to: StateRef,
    pub cause: TransitionCause,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    /// Relocations break the chain of declared edges.
    pub fn is_discontinuous(&self) -> bool {
        matches!(self.cause, TransitionCause::Relocate)
    }
}

/// Ordered history of transitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place.
    pub fn push(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// Get the path of leaves traversed.
    ///
    /// Returns the `from` of the first transition, then the `to` of each.
    pub fn get_path(&self) -> Vec<&StateRef> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CatalogId;

    fn state(name: &str) -> StateRef {
        StateRef::new(CatalogId::new("Main", 0), name)
    }

    fn step(from: &str, to: &str) -> StateTransition {
        StateTransition {
            from: state(from),
            to: state(to),
            cause: TransitionCause::Trigger(Trigger::Next),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(step("IDLE", "RUNNING"));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn push_appends_in_place() {
        let mut history = StateHistory::new();
        for _ in 0..1_000 {
            history.push(step("IDLE", "RUNNING"));
            history.push(step("RUNNING", "IDLE"));
        }

        assert_eq!(history.len(), 2_000);
        assert_eq!(history.last().unwrap().to, state("IDLE"));
    }

    #[test]
    fn get_path_returns_leaf_sequence() {
        let history = StateHistory::new()
            .record(step("IDLE", "RUNNING"))
            .record(step("RUNNING", "DONE"));

        let path = history.get_path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].name(), "IDLE");
        assert_eq!(path[1].name(), "RUNNING");
        assert_eq!(path[2].name(), "DONE");
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let history = StateHistory::new().record(step("IDLE", "RUNNING"));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn relocation_is_discontinuous() {
        let mut transition = step("RUNNING", "IDLE");
        assert!(!transition.is_discontinuous());
        transition.cause = TransitionCause::Relocate;
        assert!(transition.is_discontinuous());
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(step("IDLE", "RUNNING"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history.len(), deserialized.len());
        assert_eq!(deserialized.last().unwrap().to, state("RUNNING"));
    }
}
