//! Turns catalog transition rules into live edges.
//!
//! For every state with transition rules:
//! 1. `next` edges: a single target, or one guarded `option` edge per
//!    alternative plus a plain `next` edge to the first one.
//! 2. `previous` edges: every forward edge S → T gets a reverse edge
//!    T → S guarded by "T was entered from S", unless T is final or declares
//!    its own previous override. A state overriding previous with another
//!    state gets one unconditional edge to it, installed once all forward
//!    edges are known. No override edge is installed when the override names
//!    the state itself, or when every forward edge into the state comes from
//!    the override target.
//! 3. named edges: one per optional target, fired by `to_<target>`.

use crate::core::{
    event_name, Catalog, Guard, GuardContext, Next, NodeId, Scope, StateDescriptor, StateRef,
    Trigger,
};
use crate::engine::index::StateIndex;
use crate::validation::{ConfigError, EdgeKind};

/// Event an edge listens to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeEvent {
    Next,
    Previous,
    Option,
    Named(String),
}

impl EdgeEvent {
    pub fn matches(&self, trigger: &Trigger) -> bool {
        match (self, trigger) {
            (Self::Next, Trigger::Next)
            | (Self::Previous, Trigger::Previous)
            | (Self::Option, Trigger::Option { .. }) => true,
            (Self::Named(event), Trigger::Named(name)) => event == name,
            _ => false,
        }
    }
}

/// One wired transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub event: EdgeEvent,
    pub guard: Guard,
}

impl Edge {
    /// Check if this edge fires for `context` (pure).
    pub fn can_fire(&self, context: &GuardContext<'_>) -> bool {
        self.event.matches(context.trigger) && self.guard.check(context)
    }
}

/// Previous overrides held back until every forward edge is wired.
struct Overrides {
    /// State and the sibling its `previous` is redirected to.
    declared: Vec<(NodeId, NodeId)>,
    /// Forward sources of every node that declares an override.
    entered_from: Vec<Vec<NodeId>>,
}

/// Outgoing edges of every node, in wiring order.
#[derive(Clone, Debug, Default)]
pub struct EdgeTable {
    outgoing: Vec<Vec<Edge>>,
}

impl EdgeTable {
    /// Wire the whole catalog tree. `index` must already hold every state.
    pub(crate) fn wire(catalog: &Catalog, index: &StateIndex) -> Result<Self, ConfigError> {
        let mut table = Self {
            outgoing: vec![Vec::new(); index.len()],
        };
        let mut overrides = Overrides {
            declared: Vec::new(),
            entered_from: vec![Vec::new(); index.len()],
        };
        table.wire_level(catalog, None, index, &mut overrides)?;
        table.install_overrides(overrides);
        Ok(table)
    }

    pub fn outgoing(&self, node: NodeId) -> &[Edge] {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, source: NodeId, target: NodeId, event: EdgeEvent, guard: Guard) {
        let edge = Edge {
            source,
            target,
            event,
            guard,
        };
        let edges = &mut self.outgoing[source.index()];
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    fn wire_level(
        &mut self,
        level: &Catalog,
        enclosing: Option<&Catalog>,
        index: &StateIndex,
        overrides: &mut Overrides,
    ) -> Result<(), ConfigError> {
        let scope = Scope::new(level, enclosing);

        for state in level.states() {
            let me = StateRef::new(level.id().clone(), state.name());
            let source = node_of(index, &me)?;

            declare_prev_override(&scope, state, &me, source, index, overrides)?;

            if !state.is_final() {
                if let Some(next) = state.transitions().and_then(|t| t.next()) {
                    self.wire_next(&scope, next, &me, source, index, overrides)?;
                }
                for target in state.optional_targets() {
                    let (_, target_node) =
                        resolve(&scope, target, &me, EdgeKind::Optional, index)?;
                    self.add(
                        source,
                        target_node,
                        EdgeEvent::Named(event_name(target)),
                        Guard::Always,
                    );
                }
            }

            if let Some(sub) = state.sub_catalog() {
                self.wire_level(sub, Some(level), index, overrides)?;
            }
        }
        Ok(())
    }

    fn wire_next(
        &mut self,
        scope: &Scope<'_>,
        next: &Next,
        me: &StateRef,
        source: NodeId,
        index: &StateIndex,
        overrides: &mut Overrides,
    ) -> Result<(), ConfigError> {
        match next {
            Next::Single(target) => {
                let (descriptor, target_node) = resolve(scope, target, me, EdgeKind::Next, index)?;
                self.add(source, target_node, EdgeEvent::Next, Guard::Always);
                self.wire_reverse(descriptor, target_node, source, overrides);
            }
            Next::Options(targets) => {
                for (position, target) in targets.iter().enumerate() {
                    let (descriptor, target_node) =
                        resolve(scope, target, me, EdgeKind::Option, index)?;
                    if position == 0 {
                        self.add(source, target_node, EdgeEvent::Next, Guard::Always);
                    }
                    self.add(
                        source,
                        target_node,
                        EdgeEvent::Option,
                        Guard::OptionPayload {
                            index: position,
                            name: target.clone(),
                        },
                    );
                    self.wire_reverse(descriptor, target_node, source, overrides);
                }
            }
        }
        Ok(())
    }

    fn wire_reverse(
        &mut self,
        target: &StateDescriptor,
        target_node: NodeId,
        source: NodeId,
        overrides: &mut Overrides,
    ) {
        if target.is_final() {
            return;
        }
        if target.prev_override().is_some() {
            overrides.entered_from[target_node.index()].push(source);
            return;
        }
        self.add(
            target_node,
            source,
            EdgeEvent::Previous,
            Guard::ArrivedFrom(source),
        );
    }

    /// Override edges go first in their state's list.
    fn install_overrides(&mut self, overrides: Overrides) {
        for (state, target) in overrides.declared {
            let sources = &overrides.entered_from[state.index()];
            if !sources.is_empty() && sources.iter().all(|source| *source == target) {
                continue;
            }
            self.outgoing[state.index()].insert(
                0,
                Edge {
                    source: state,
                    target,
                    event: EdgeEvent::Previous,
                    guard: Guard::Always,
                },
            );
        }
    }
}

fn declare_prev_override(
    scope: &Scope<'_>,
    state: &StateDescriptor,
    me: &StateRef,
    source: NodeId,
    index: &StateIndex,
    overrides: &mut Overrides,
) -> Result<(), ConfigError> {
    let Some(target) = state.prev_override() else {
        return Ok(());
    };
    if state.is_final() || target == state.name() {
        return Ok(());
    }
    let descriptor = scope
        .resolve_sibling(target)
        .ok_or_else(|| ConfigError::PrevOverrideOutOfScope {
            state: me.clone(),
            target: target.to_string(),
        })?;
    let target_node = node_of(index, &StateRef::new(scope.level().id().clone(), descriptor.name()))?;
    overrides.declared.push((source, target_node));
    Ok(())
}

fn node_of(index: &StateIndex, state: &StateRef) -> Result<NodeId, ConfigError> {
    index.node(state).ok_or_else(|| ConfigError::UnresolvedTarget {
        state: state.clone(),
        target: state.name().to_string(),
        kind: EdgeKind::Next,
    })
}

fn resolve<'a>(
    scope: &Scope<'a>,
    target: &str,
    me: &StateRef,
    kind: EdgeKind,
    index: &StateIndex,
) -> Result<(&'a StateDescriptor, NodeId), ConfigError> {
    let (_, level, descriptor) =
        scope
            .resolve(target)
            .ok_or_else(|| ConfigError::UnresolvedTarget {
                state: me.clone(),
                target: target.to_string(),
                kind,
            })?;
    let node = node_of(index, &StateRef::new(level.id().clone(), descriptor.name()))?;
    Ok((descriptor, node))
}
