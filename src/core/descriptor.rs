//! State and transition descriptors.
//!
//! Descriptors are plain data: they say what a state is called, where the
//! linear chain goes next, where reverse navigation lands, and which named
//! jumps leave it. The engine turns them into live edges.

use super::catalog::Catalog;
use super::hooks::Hooks;
use super::id::StateRef;
use serde::{Deserialize, Serialize};

/// Forward target of a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Next {
    /// One successor, reached with `next`.
    Single(String),

    /// Ordered alternatives, reached with `option(i, name)`. The first one
    /// is also the default `next` step.
    Options(Vec<String>),
}

impl Next {
    /// All targets in declaration order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Single(target) => vec![target.as_str()],
            Self::Options(targets) => targets.iter().map(String::as_str).collect(),
        }
    }

    /// Target of the plain `next` step.
    pub fn default_target(&self) -> Option<&str> {
        match self {
            Self::Single(target) => Some(target.as_str()),
            Self::Options(targets) => targets.first().map(String::as_str),
        }
    }
}

/// Transition rules of one state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transitions {
    next: Option<Next>,
    prev_override: Option<String>,
    optional_targets: Vec<String>,
}

impl Transitions {
    /// Single linear successor.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            next: Some(Next::Single(target.into())),
            ..Self::default()
        }
    }

    /// Several forward alternatives; the first is the default.
    pub fn branch<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            next: Some(Next::Options(targets.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Where `previous` lands once this state was entered.
    ///
    /// Naming the state itself disables reverse navigation out of it.
    pub fn with_prev(mut self, target: impl Into<String>) -> Self {
        self.prev_override = Some(target.into());
        self
    }

    /// Named jump targets reachable from this state.
    pub fn with_optional<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.optional_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub(crate) fn set_next(&mut self, next: Next) {
        self.next = Some(next);
    }

    pub fn next(&self) -> Option<&Next> {
        self.next.as_ref()
    }

    pub fn prev_override(&self) -> Option<&str> {
        self.prev_override.as_deref()
    }

    pub fn optional_targets(&self) -> &[String] {
        &self.optional_targets
    }
}

/// One state inside an instantiated catalog.
///
/// Built by the catalog builder; the `parent` link is bound when the
/// enclosing catalog attaches this state's catalog and never changes after.
#[derive(Clone, Debug)]
pub struct StateDescriptor {
    pub(crate) name: String,
    pub(crate) transitions: Option<Transitions>,
    pub(crate) sub_catalog: Option<Catalog>,
    pub(crate) initial: bool,
    pub(crate) is_final: bool,
    pub(crate) parent: Option<StateRef>,
    pub(crate) hooks: Hooks,
}

impl StateDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> Option<&Transitions> {
        self.transitions.as_ref()
    }

    pub fn sub_catalog(&self) -> Option<&Catalog> {
        self.sub_catalog.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.sub_catalog.is_some()
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Identity of the enclosing composite state, if any.
    pub fn parent(&self) -> Option<&StateRef> {
        self.parent.as_ref()
    }

    /// Hooks registered for this state at authoring time.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Every forward target (`next` and options) in declaration order.
    pub fn next_targets(&self) -> Vec<&str> {
        self.transitions
            .as_ref()
            .and_then(Transitions::next)
            .map(Next::targets)
            .unwrap_or_default()
    }

    pub fn prev_override(&self) -> Option<&str> {
        self.transitions.as_ref().and_then(Transitions::prev_override)
    }

    pub fn optional_targets(&self) -> &[String] {
        self.transitions
            .as_ref()
            .map(Transitions::optional_targets)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_defaults_to_first_option() {
        let transitions = Transitions::branch(["A", "B", "C"]);
        let next = transitions.next().unwrap();
        assert_eq!(next.default_target(), Some("A"));
        assert_eq!(next.targets(), vec!["A", "B", "C"]);
    }

    #[test]
    fn fluent_transitions_collect_all_rules() {
        let transitions = Transitions::to("STOPPED")
            .with_prev("STOPPING")
            .with_optional(["ERROR"]);

        assert_eq!(transitions.next(), Some(&Next::Single("STOPPED".into())));
        assert_eq!(transitions.prev_override(), Some("STOPPING"));
        assert_eq!(transitions.optional_targets(), ["ERROR".to_string()]);
    }

    #[test]
    fn transitions_serialize_correctly() {
        let transitions = Transitions::branch(["A", "B"]).with_optional(["ERROR"]);
        let json = serde_json::to_string(&transitions).unwrap();
        let deserialized: Transitions = serde_json::from_str(&json).unwrap();
        assert_eq!(transitions, deserialized);
    }
}
