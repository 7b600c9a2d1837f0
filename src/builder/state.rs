//! Fluent declaration of a single state inside a template.

use crate::builder::template::CatalogTemplate;
use crate::core::{HookEvent, Hooks, Next, StateEvent, Transitions};
use std::sync::Arc;

/// Authoring-time declaration of a state.
///
/// A declaration is turned into a [`StateDescriptor`](crate::core::StateDescriptor)
/// when its template is instantiated.
///
/// # Example
///
/// ```rust
/// use statechart::builder::StateDecl;
///
/// let idle = StateDecl::new("IDLE")
///     .initial()
///     .next("STARTING")
///     .optional(["STOPPING", "ERROR"]);
/// assert_eq!(idle.name(), "IDLE");
/// ```
#[derive(Clone, Debug)]
pub struct StateDecl {
    pub(crate) name: String,
    pub(crate) transitions: Option<Transitions>,
    pub(crate) sub: Option<CatalogTemplate>,
    pub(crate) initial: bool,
    pub(crate) is_final: bool,
    pub(crate) hooks: Hooks,
}

impl StateDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: None,
            sub: None,
            initial: false,
            is_final: false,
            hooks: Hooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark as the entry state of its catalog.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Mark as a final state; entering it completes the enclosing level.
    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Replace all transition rules at once.
    pub fn transitions(mut self, transitions: Transitions) -> Self {
        self.transitions = Some(transitions);
        self
    }

    /// Single linear successor.
    pub fn next(mut self, target: impl Into<String>) -> Self {
        self.rules().set_next(Next::Single(target.into()));
        self
    }

    /// Forward alternatives; the first one is the default `next` step.
    pub fn options<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let targets = targets.into_iter().map(Into::into).collect();
        self.rules().set_next(Next::Options(targets));
        self
    }

    /// Override where `previous` lands from this state.
    pub fn prev(mut self, target: impl Into<String>) -> Self {
        let rules = self.transitions.take().unwrap_or_default();
        self.transitions = Some(rules.with_prev(target));
        self
    }

    /// Named jump targets.
    pub fn optional<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let rules = self.transitions.take().unwrap_or_default();
        self.transitions = Some(rules.with_optional(targets));
        self
    }

    /// Turn this state into a composite whose body is `template`.
    ///
    /// The template is instantiated afresh for every state that uses it.
    pub fn sub_states(mut self, template: CatalogTemplate) -> Self {
        self.sub = Some(template);
        self
    }

    pub fn on_entered<F>(self, hook: F) -> Self
    where
        F: Fn(&StateEvent<'_>) + Send + Sync + 'static,
    {
        self.on(HookEvent::Entered, hook)
    }

    pub fn on_exited<F>(self, hook: F) -> Self
    where
        F: Fn(&StateEvent<'_>) + Send + Sync + 'static,
    {
        self.on(HookEvent::Exited, hook)
    }

    pub fn on_finished<F>(self, hook: F) -> Self
    where
        F: Fn(&StateEvent<'_>) + Send + Sync + 'static,
    {
        self.on(HookEvent::Finished, hook)
    }

    /// Attach a hook for one lifecycle point of this state.
    pub fn on<F>(mut self, event: HookEvent, hook: F) -> Self
    where
        F: Fn(&StateEvent<'_>) + Send + Sync + 'static,
    {
        self.hooks.push(event, Arc::new(hook));
        self
    }

    fn rules(&mut self) -> &mut Transitions {
        self.transitions.get_or_insert_with(Transitions::default)
    }
}
