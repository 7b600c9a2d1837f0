//! The live hierarchical state machine.

use crate::builder::BuildError;
use crate::core::{
    Catalog, GuardContext, HookEvent, Hooks, NodeId, StateDescriptor, StateEvent, StateHistory,
    StateRef, StateTransition, TransitionCause, Trigger,
};
use crate::engine::index::StateIndex;
use crate::engine::observer::{HookResolver, HookTable, Observer};
use crate::engine::triggers::TriggerSet;
use crate::engine::wiring::EdgeTable;
use crate::validation::{validate, ConfigError, MAX_DEPTH};
use chrono::Utc;
use stillwater::validation::Validation;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Runtime errors of a built engine.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("State '{0}' is not part of this machine")]
    UnknownState(StateRef),

    #[error("No state at path '{}'", .0.join("."))]
    UnknownPath(Vec<String>),
}

/// Outcome of dispatching one trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// An edge fired; `from` and `to` are the leaves before and after.
    Transitioned { from: NodeId, to: NodeId },

    /// No edge matched from the current configuration.
    Ignored,
}

impl Dispatch {
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}

/// Tree position of a live node.
#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    initial_child: Option<NodeId>,
    /// Indices from the root catalog down to this node's descriptor.
    position: Vec<usize>,
    /// Root-to-node ancestry, ending with the node itself.
    path: Vec<NodeId>,
    is_final: bool,
}

/// A running hierarchical state machine.
///
/// Exactly one state is active per hierarchy level; `current_state` is the
/// innermost one. Triggers are offered to the current leaf first and then to
/// each ancestor, so substates override the edges of their composite.
///
/// The engine does no locking: handlers run on the caller's thread inside
/// `trigger`/`relocate`, and calls must be serialized by the caller (see
/// [`crate::driver`] for a channel front-end).
///
/// # Example
///
/// ```rust
/// use statechart::builder::{CatalogTemplate, StateDecl};
/// use statechart::engine::Engine;
/// use statechart::Trigger;
///
/// let catalog = CatalogTemplate::new("Main")
///     .state(StateDecl::new("IDLE").initial().next("RUNNING"))
///     .state(StateDecl::new("RUNNING").next("DONE").optional(["ERROR"]))
///     .state(StateDecl::new("DONE").final_state())
///     .state(StateDecl::new("ERROR").next("IDLE").prev("IDLE"))
///     .build()
///     .unwrap();
///
/// let mut engine = Engine::builder(catalog).build().unwrap();
/// engine.trigger(Trigger::Next);
/// engine.trigger(Trigger::error());
/// engine.trigger(Trigger::Previous);
/// assert_eq!(engine.current_state_ref().name(), "IDLE");
/// ```
pub struct Engine {
    catalog: Catalog,
    index: StateIndex,
    nodes: Vec<Node>,
    root_initial: NodeId,
    edges: EdgeTable,
    hooks: Vec<Hooks>,
    observers: Vec<Box<dyn Observer>>,
    triggers: TriggerSet,
    current: NodeId,
    previous: Option<NodeId>,
    arrived_from: Vec<Option<NodeId>>,
    running: bool,
    history: StateHistory,
}

impl Engine {
    /// Start configuring an engine for `catalog`.
    pub fn builder(catalog: Catalog) -> crate::builder::EngineBuilder {
        crate::builder::EngineBuilder::new(catalog)
    }

    /// Validate, build the node tree, wire edges and hooks, and start.
    pub(crate) fn construct(
        catalog: Catalog,
        observers: Vec<Box<dyn Observer>>,
        triggers: TriggerSet,
        table: HookTable,
    ) -> Result<Self, BuildError> {
        if let Validation::Failure(errors) = validate(&catalog, &triggers) {
            return Err(BuildError::InvalidCatalog {
                violations: errors.iter().cloned().collect(),
            });
        }

        let mut index = StateIndex::new();
        let mut nodes = Vec::with_capacity(catalog.total_states());
        let mut root_initial = None;
        register_level(&catalog, None, &[], &mut index, &mut nodes, &mut root_initial)?;
        let root_initial = root_initial.ok_or_else(|| ConfigError::MissingInitialState {
            catalog: catalog.id().clone(),
        })?;

        for node in 0..nodes.len() {
            nodes[node].path = ancestry(&nodes, &index, NodeId::new(node))?;
        }

        let edges = EdgeTable::wire(&catalog, &index)?;

        let mut resolver = HookResolver::new(&table);
        let hooks = nodes
            .iter()
            .map(|node| match locate(&catalog, &node.position) {
                Some(descriptor) => {
                    let parent = descriptor.parent().map(StateRef::name);
                    resolver.resolve(descriptor.name(), parent, descriptor.hooks())
                }
                None => Hooks::default(),
            })
            .collect();
        for name in resolver.unmatched() {
            warn!(hook = name, "hook matches no state");
        }

        debug!(
            catalog = %catalog.id(),
            states = nodes.len(),
            edges = edges.len(),
            observers = observers.len(),
            "state machine wired"
        );

        let count = nodes.len();
        let mut engine = Self {
            catalog,
            index,
            nodes,
            root_initial,
            edges,
            hooks,
            observers,
            triggers,
            current: root_initial,
            previous: None,
            arrived_from: vec![None; count],
            running: false,
            history: StateHistory::new(),
        };
        engine.start_at(root_initial);
        info!(
            catalog = %engine.catalog.id(),
            state = %engine.current_state_ref(),
            "state machine started"
        );
        Ok(engine)
    }

    /// Dispatch one trigger.
    ///
    /// Triggers without a matching edge, and every trigger after the machine
    /// finished, are ignored.
    pub fn trigger(&mut self, trigger: Trigger) -> Dispatch {
        if !self.running {
            trace!(%trigger, "machine not running, trigger ignored");
            return Dispatch::Ignored;
        }

        let from = self.current;
        let path = self.nodes[from.index()].path.clone();
        for &node in path.iter().rev() {
            let context = GuardContext {
                trigger: &trigger,
                arrived_from: self.arrived_from[node.index()],
            };
            let fired = self
                .edges
                .outgoing(node)
                .iter()
                .find(|edge| edge.can_fire(&context))
                .map(|edge| (edge.source, edge.target));

            if let Some((source, target)) = fired {
                self.transition(source, target, &trigger);
                debug!(
                    %trigger,
                    from = %self.state_ref(from),
                    to = %self.current_state_ref(),
                    "transition"
                );
                return Dispatch::Transitioned {
                    from,
                    to: self.current,
                };
            }
        }

        trace!(%trigger, state = %self.state_ref(from), "no edge matched");
        Dispatch::Ignored
    }

    pub fn next(&mut self) -> Dispatch {
        self.trigger(Trigger::Next)
    }

    pub fn previous(&mut self) -> Dispatch {
        self.trigger(Trigger::Previous)
    }

    pub fn option(&mut self, index: usize, name: &str) -> Dispatch {
        self.trigger(Trigger::option(index, name))
    }

    pub fn stop(&mut self) -> Dispatch {
        self.trigger(Trigger::stop())
    }

    pub fn error(&mut self) -> Dispatch {
        self.trigger(Trigger::error())
    }

    /// Named jump to `target` through its `to_<target>` event.
    pub fn jump(&mut self, target: &str) -> Dispatch {
        self.trigger(Trigger::jump(target))
    }

    /// Restart the machine at `target`, bypassing every declared edge.
    ///
    /// The abandoned configuration gets no exited or finished notification;
    /// the new one is entered exactly as on a fresh start. The previous
    /// pointer and all arrival origins are cleared.
    pub fn relocate(&mut self, target: &StateRef) -> Result<(), EngineError> {
        let node = self
            .index
            .node(target)
            .ok_or_else(|| EngineError::UnknownState(target.clone()))?;
        self.relocate_node(node);
        Ok(())
    }

    /// [`relocate`](Self::relocate) to a state addressed by names from the
    /// root, e.g. `["CALIBRATION_2", "EXECUTE"]`.
    pub fn relocate_path(&mut self, path: &[&str]) -> Result<(), EngineError> {
        let node = self.find(path).ok_or_else(|| {
            EngineError::UnknownPath(path.iter().map(|name| name.to_string()).collect())
        })?;
        self.relocate_node(node);
        Ok(())
    }

    /// Relocate to the catalog's initial state.
    pub fn restart(&mut self) {
        self.relocate_node(self.root_initial);
    }

    fn relocate_node(&mut self, node: NodeId) {
        let from = self.current_state_ref().clone();
        self.running = false;
        self.arrived_from.iter_mut().for_each(|origin| *origin = None);
        self.start_at(node);
        info!(
            from = %from,
            to = %self.current_state_ref(),
            "state machine relocated"
        );
        let to = self.current_state_ref().clone();
        self.history.push(StateTransition {
            from,
            to,
            cause: TransitionCause::Relocate,
            timestamp: Utc::now(),
        });
    }

    /// Enter `node` with its whole ancestry, then descend initial children.
    fn start_at(&mut self, node: NodeId) {
        self.running = true;
        self.previous = None;
        let path = self.nodes[node.index()].path.clone();
        for &entered in &path {
            self.notify(entered, HookEvent::Entered);
        }
        let leaf = self.descend(node);
        self.current = leaf;
        self.complete_if_final(leaf);
    }

    fn transition(&mut self, source: NodeId, target: NodeId, trigger: &Trigger) {
        let from = self.current;
        let active = self.nodes[from.index()].path.clone();
        let entering = self.nodes[target.index()].path.clone();
        let common = common_ancestors(
            &self.nodes[source.index()].path,
            &self.nodes[target.index()].path,
        );

        // Final states report completion through their parent, never an exit.
        for &exited in active[common..].iter().rev() {
            if !self.nodes[exited.index()].is_final {
                self.notify(exited, HookEvent::Exited);
            }
            self.arrived_from[exited.index()] = None;
        }

        self.arrived_from[target.index()] = Some(source);
        for &entered in &entering[common..] {
            self.notify(entered, HookEvent::Entered);
        }
        let leaf = self.descend(target);

        self.previous = Some(from);
        self.current = leaf;
        let from = self.state_ref(from).clone();
        let to = self.state_ref(leaf).clone();
        self.history.push(StateTransition {
            from,
            to,
            cause: TransitionCause::Trigger(trigger.clone()),
            timestamp: Utc::now(),
        });
        self.complete_if_final(leaf);
    }

    /// Enter initial children below `node` down to a leaf.
    fn descend(&mut self, node: NodeId) -> NodeId {
        let mut leaf = node;
        while let Some(child) = self.nodes[leaf.index()].initial_child {
            self.notify(child, HookEvent::Entered);
            leaf = child;
        }
        leaf
    }

    fn complete_if_final(&mut self, leaf: NodeId) {
        if !self.nodes[leaf.index()].is_final {
            return;
        }
        match self.nodes[leaf.index()].parent {
            Some(parent) => self.notify(parent, HookEvent::Finished),
            None => {
                self.running = false;
                info!(state = %self.state_ref(leaf), "state machine finished");
                for observer in &mut self.observers {
                    observer.machine_finished();
                }
            }
        }
    }

    fn notify(&mut self, node: NodeId, event: HookEvent) {
        let Some(live) = self.nodes.get(node.index()) else {
            return;
        };
        let (Some(state), Some(descriptor)) = (
            self.index.state(node),
            locate(&self.catalog, &live.position),
        ) else {
            return;
        };
        let path: Vec<StateRef> = live
            .path
            .iter()
            .map(|ancestor| self.index.state_at(*ancestor).clone())
            .collect();
        let payload = StateEvent {
            node,
            state,
            descriptor,
            path: &path,
        };

        for observer in self.observers.iter_mut() {
            match event {
                HookEvent::Entered => observer.state_entered(&payload),
                HookEvent::Exited => observer.state_exited(&payload),
                HookEvent::Finished => observer.state_finished(&payload),
            }
        }
        for hook in self.hooks[node.index()].get(event) {
            hook(&payload);
        }
    }

    fn state_ref(&self, node: NodeId) -> &StateRef {
        self.index.state_at(node)
    }

    /// Innermost active node.
    pub fn current_state(&self) -> NodeId {
        self.current
    }

    /// Leaf that was active before the last transition; `None` right after
    /// construction or relocation.
    pub fn previous_state(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn current_state_ref(&self) -> &StateRef {
        self.state_ref(self.current)
    }

    pub fn previous_state_ref(&self) -> Option<&StateRef> {
        self.previous.map(|node| self.state_ref(node))
    }

    /// Descriptor backing `node`; `None` for nodes of another engine.
    pub fn descriptor(&self, node: NodeId) -> Option<&StateDescriptor> {
        let node = self.nodes.get(node.index())?;
        locate(&self.catalog, &node.position)
    }

    /// Composite state enclosing the current leaf.
    pub fn current_super_state(&self) -> Option<&StateRef> {
        self.descriptor(self.current)?.parent()
    }

    /// Composite state enclosing the previous leaf.
    pub fn previous_super_state(&self) -> Option<&StateRef> {
        self.descriptor(self.previous?)?.parent()
    }

    /// Root-to-leaf identities of the active configuration.
    pub fn current_state_tree(&self) -> Vec<StateRef> {
        self.nodes[self.current.index()]
            .path
            .iter()
            .map(|node| self.state_ref(*node).clone())
            .collect()
    }

    /// [`current_state_tree`](Self::current_state_tree) joined with `.`.
    pub fn current_path_string(&self) -> String {
        self.current_state_tree()
            .iter()
            .map(StateRef::name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Root-to-leaf names of the active configuration.
    pub fn current_path_names(&self) -> Vec<String> {
        self.current_state_tree()
            .into_iter()
            .map(|state| state.name().to_string())
            .collect()
    }

    /// Is `state` part of the active configuration?
    pub fn is_active(&self, state: &StateRef) -> bool {
        self.index
            .node(state)
            .is_some_and(|node| self.nodes[self.current.index()].path.contains(&node))
    }

    /// Node addressed by names from the root catalog down.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        let mut catalog = &self.catalog;
        let mut found = None;
        for (depth, name) in path.iter().enumerate() {
            if depth > 0 {
                catalog = catalog.get(path[depth - 1])?.sub_catalog()?;
            }
            found = self.index.node(&catalog.state_ref(name)?);
        }
        found
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &StateIndex {
        &self.index
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.edges
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub(crate) fn set_history(&mut self, history: StateHistory) {
        self.history = history;
    }

    /// False once a top-level final state was entered.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        !self.running
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("catalog", self.catalog.id())
            .field("current", self.current_state_ref())
            .field("previous", &self.previous_state_ref())
            .field("running", &self.running)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn register_level(
    catalog: &Catalog,
    parent: Option<NodeId>,
    position: &[usize],
    index: &mut StateIndex,
    nodes: &mut Vec<Node>,
    initial: &mut Option<NodeId>,
) -> Result<(), ConfigError> {
    for (slot, state) in catalog.states().iter().enumerate() {
        let id = index.insert(StateRef::new(catalog.id().clone(), state.name()));
        let mut here = position.to_vec();
        here.push(slot);
        nodes.push(Node {
            parent,
            initial_child: None,
            position: here.clone(),
            path: Vec::new(),
            is_final: state.is_final(),
        });

        if state.is_initial() && initial.is_none() {
            *initial = Some(id);
        }

        if let Some(sub) = state.sub_catalog() {
            let mut child_initial = None;
            register_level(sub, Some(id), &here, index, nodes, &mut child_initial)?;
            nodes[id.index()].initial_child = Some(child_initial.ok_or_else(|| {
                ConfigError::MissingInitialState {
                    catalog: sub.id().clone(),
                }
            })?);
        }
    }
    Ok(())
}

/// Walk parent links upward from `node`, guarded against runaway depth.
fn ancestry(nodes: &[Node], index: &StateIndex, node: NodeId) -> Result<Vec<NodeId>, ConfigError> {
    let mut path = vec![node];
    let mut cursor = nodes[node.index()].parent;
    while let Some(parent) = cursor {
        if path.len() > MAX_DEPTH {
            return Err(ConfigError::MalformedHierarchy {
                state: index.state_at(node).clone(),
                depth: path.len(),
                limit: MAX_DEPTH,
            });
        }
        path.push(parent);
        cursor = nodes[parent.index()].parent;
    }
    path.reverse();
    Ok(path)
}

/// Number of shared ancestors strictly above both `source` and `target`.
fn common_ancestors(source: &[NodeId], target: &[NodeId]) -> usize {
    let source_parents = &source[..source.len().saturating_sub(1)];
    let target_parents = &target[..target.len().saturating_sub(1)];
    source_parents
        .iter()
        .zip(target_parents)
        .take_while(|(a, b)| a == b)
        .count()
}

fn locate<'a>(catalog: &'a Catalog, position: &[usize]) -> Option<&'a StateDescriptor> {
    let (last, above) = position.split_last()?;
    let mut level = catalog;
    for slot in above {
        level = level.states().get(*slot)?.sub_catalog()?;
    }
    level.states().get(*last)
}
