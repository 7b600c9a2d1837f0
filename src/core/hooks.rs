//! Per-state hooks and the notification payload handed to them.

use super::descriptor::StateDescriptor;
use super::id::{NodeId, StateRef};
use std::fmt;
use std::sync::Arc;

/// Lifecycle point of a state that observers can react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Entered,
    Exited,
    /// The state's sub-machine reached one of its final states.
    Finished,
}

impl HookEvent {
    pub const ALL: [HookEvent; 3] = [Self::Entered, Self::Exited, Self::Finished];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::Exited => "exited",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What observers and hooks receive on every notification.
#[derive(Clone, Copy, Debug)]
pub struct StateEvent<'a> {
    /// Live node the notification is about.
    pub node: NodeId,
    /// Logical identity of that node.
    pub state: &'a StateRef,
    pub descriptor: &'a StateDescriptor,
    /// Root-to-node identities, ending with `state`.
    pub path: &'a [StateRef],
}

impl StateEvent<'_> {
    /// The ancestor path joined with `.`, e.g. `CALIBRATION_1.STARTING`.
    pub fn log_line(&self) -> String {
        self.path
            .iter()
            .map(StateRef::name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Enclosing composite state, if any.
    pub fn parent(&self) -> Option<&StateRef> {
        self.descriptor.parent()
    }
}

/// Callback attached to a single state.
///
/// Hooks run inline during dispatch and must not block.
pub type HookFn = Arc<dyn Fn(&StateEvent<'_>) + Send + Sync>;

/// Hooks of one state, grouped by lifecycle point.
#[derive(Clone, Default)]
pub struct Hooks {
    entered: Vec<HookFn>,
    exited: Vec<HookFn>,
    finished: Vec<HookFn>,
}

impl Hooks {
    pub fn push(&mut self, event: HookEvent, hook: HookFn) {
        self.slot_mut(event).push(hook);
    }

    pub fn extend(&mut self, other: &Hooks) {
        for event in HookEvent::ALL {
            self.slot_mut(event).extend(other.get(event).iter().cloned());
        }
    }

    pub fn get(&self, event: HookEvent) -> &[HookFn] {
        match event {
            HookEvent::Entered => &self.entered,
            HookEvent::Exited => &self.exited,
            HookEvent::Finished => &self.finished,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty() && self.finished.is_empty()
    }

    fn slot_mut(&mut self, event: HookEvent) -> &mut Vec<HookFn> {
        match event {
            HookEvent::Entered => &mut self.entered,
            HookEvent::Exited => &mut self.exited,
            HookEvent::Finished => &mut self.finished,
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("entered", &self.entered.len())
            .field("exited", &self.exited.len())
            .field("finished", &self.finished.len())
            .finish()
    }
}
