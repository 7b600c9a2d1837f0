//! Bidirectional mapping between state identities and live nodes.

use crate::core::{NodeId, StateRef};
use std::collections::HashMap;

/// Flat state-identity ↔ node table, filled once while the engine builds
/// its node tree.
#[derive(Clone, Debug, Default)]
pub struct StateIndex {
    forward: HashMap<StateRef, NodeId>,
    reverse: Vec<StateRef>,
}

impl StateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state and hand out the next node id.
    ///
    /// Registering the same identity twice returns the existing node.
    pub(crate) fn insert(&mut self, state: StateRef) -> NodeId {
        if let Some(node) = self.forward.get(&state) {
            return *node;
        }
        let node = NodeId::new(self.reverse.len());
        self.forward.insert(state.clone(), node);
        self.reverse.push(state);
        node
    }

    /// Node built for `state`.
    pub fn node(&self, state: &StateRef) -> Option<NodeId> {
        self.forward.get(state).copied()
    }

    /// Identity of `node`.
    pub fn state(&self, node: NodeId) -> Option<&StateRef> {
        self.reverse.get(node.index())
    }

    /// Identity of a node handed out by this index.
    pub(crate) fn state_at(&self, node: NodeId) -> &StateRef {
        &self.reverse[node.index()]
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// All registrations in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StateRef)> {
        self.reverse
            .iter()
            .enumerate()
            .map(|(i, state)| (NodeId::new(i), state))
    }
}
