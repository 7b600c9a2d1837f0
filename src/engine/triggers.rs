//! Named trigger events an engine accepts.

use crate::core::{event_name, ERROR, STOPPING};
use std::collections::BTreeSet;

/// Set of named jump events declared on an engine.
///
/// Every optional target in a catalog needs its `to_<name>` event declared
/// here, otherwise the engine refuses to build. The default set carries the
/// `stop` and `error` controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerSet {
    events: BTreeSet<String>,
}

impl TriggerSet {
    /// A set without any named event.
    pub fn empty() -> Self {
        Self {
            events: BTreeSet::new(),
        }
    }

    /// Declare the jump event for `target`, e.g. `ABORTING` → `to_aborting`.
    pub fn with_target(mut self, target: &str) -> Self {
        self.events.insert(event_name(target));
        self
    }

    pub fn insert_target(&mut self, target: &str) {
        self.events.insert(event_name(target));
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.contains(event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(String::as_str)
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self::empty().with_target(STOPPING).with_target(ERROR)
    }
}
