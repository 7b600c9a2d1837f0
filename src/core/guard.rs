//! Guard conditions on wired edges.
//!
//! Guards are pure predicates evaluated while dispatching a trigger. An edge
//! only fires when its event matches the trigger and its guard passes.

use super::id::NodeId;
use super::trigger::Trigger;

/// Runtime facts a guard may inspect.
#[derive(Clone, Copy, Debug)]
pub struct GuardContext<'a> {
    /// The trigger being dispatched.
    pub trigger: &'a Trigger,
    /// Node whose edge last entered the edge's source state, if it was
    /// entered directly by an edge (not by descent or relocation).
    pub arrived_from: Option<NodeId>,
}

/// Pure predicate that decides whether an edge can fire.
///
/// # Example
///
/// ```rust
/// use statechart::core::{Guard, GuardContext};
/// use statechart::Trigger;
///
/// let guard = Guard::OptionPayload { index: 1, name: "B".into() };
/// let picked = Trigger::option(1, "B");
/// let other = Trigger::option(0, "A");
///
/// assert!(guard.check(&GuardContext { trigger: &picked, arrived_from: None }));
/// assert!(!guard.check(&GuardContext { trigger: &other, arrived_from: None }));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    /// Unconditional.
    Always,

    /// The `option` payload must carry exactly this position and name.
    OptionPayload { index: usize, name: String },

    /// The source state must have been entered from this node.
    ArrivedFrom(NodeId),
}

impl Guard {
    /// Check if the guard allows the edge to fire.
    pub fn check(&self, context: &GuardContext<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::OptionPayload { index, name } => matches!(
                context.trigger,
                Trigger::Option { index: i, name: n } if i == index && n == name
            ),
            Self::ArrivedFrom(origin) => context.arrived_from == Some(*origin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(trigger: &Trigger, arrived_from: Option<NodeId>) -> GuardContext<'_> {
        GuardContext {
            trigger,
            arrived_from,
        }
    }

    #[test]
    fn always_passes() {
        assert!(Guard::Always.check(&context(&Trigger::Next, None)));
    }

    #[test]
    fn option_payload_requires_index_and_name() {
        let guard = Guard::OptionPayload {
            index: 2,
            name: "FAT_PROCEDURE_3".into(),
        };

        assert!(guard.check(&context(&Trigger::option(2, "FAT_PROCEDURE_3"), None)));
        assert!(!guard.check(&context(&Trigger::option(1, "FAT_PROCEDURE_3"), None)));
        assert!(!guard.check(&context(&Trigger::option(2, "FAT_PROCEDURE_2"), None)));
        assert!(!guard.check(&context(&Trigger::Next, None)));
    }

    #[test]
    fn arrived_from_matches_origin_only() {
        let guard = Guard::ArrivedFrom(NodeId::new(3));

        assert!(guard.check(&context(&Trigger::Previous, Some(NodeId::new(3)))));
        assert!(!guard.check(&context(&Trigger::Previous, Some(NodeId::new(4)))));
        assert!(!guard.check(&context(&Trigger::Previous, None)));
    }

    #[test]
    fn guard_is_deterministic() {
        let trigger = Trigger::option(0, "A");
        let guard = Guard::OptionPayload {
            index: 0,
            name: "A".into(),
        };
        let ctx = context(&trigger, None);
        assert_eq!(guard.check(&ctx), guard.check(&ctx));
    }
}
