//! Observer capability and per-state hook resolution.
//!
//! Two ways to listen to a machine:
//! - implement [`Observer`] and receive every notification for every state;
//! - attach fine-grained hooks to single states, either on the
//!   [`StateDecl`](crate::builder::StateDecl) or in a [`HookTable`] keyed by
//!   canonical hook name (`state_<name>_<event>`,
//!   `state_<parent>__<name>_<event>` for substates).
//!
//! Handlers execute on the thread that calls `trigger`/`relocate`, inline
//! with the dispatch, and must not block.

use crate::core::{HookEvent, HookFn, Hooks, StateEvent};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Generic listener for every state of a machine.
pub trait Observer: Send {
    fn state_entered(&mut self, event: &StateEvent<'_>);

    fn state_exited(&mut self, _event: &StateEvent<'_>) {}

    /// The sub-machine of a composite state entered one of its final states.
    fn state_finished(&mut self, _event: &StateEvent<'_>) {}

    /// A top-level final state was entered.
    fn machine_finished(&mut self) {}
}

/// Share an observer with the code that owns the engine.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn state_entered(&mut self, event: &StateEvent<'_>) {
        self.lock().state_entered(event);
    }

    fn state_exited(&mut self, event: &StateEvent<'_>) {
        self.lock().state_exited(event);
    }

    fn state_finished(&mut self, event: &StateEvent<'_>) {
        self.lock().state_finished(event);
    }

    fn machine_finished(&mut self) {
        self.lock().machine_finished();
    }
}

/// Text log of entered states, one [`StateEvent::log_line`] per entry.
#[derive(Clone, Debug, Default)]
pub struct StateLog {
    lines: Vec<String>,
    finished: bool,
}

impl StateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The whole log, newline separated.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl Observer for StateLog {
    fn state_entered(&mut self, event: &StateEvent<'_>) {
        self.lines.push(event.log_line());
    }

    fn machine_finished(&mut self) {
        self.finished = true;
    }
}

/// Canonical hook name of a state for one lifecycle point.
///
/// ```rust
/// use statechart::core::HookEvent;
/// use statechart::engine::hook_name;
///
/// assert_eq!(hook_name("ERROR", None, HookEvent::Entered), "state_error_entered");
/// assert_eq!(
///     hook_name("IDLE", Some("CALIBRATION_1"), HookEvent::Exited),
///     "state_calibration_1__idle_exited"
/// );
/// ```
pub fn hook_name(state: &str, parent: Option<&str>, event: HookEvent) -> String {
    match parent {
        Some(parent) => format!(
            "state_{}__{}_{}",
            parent.to_lowercase(),
            state.to_lowercase(),
            event
        ),
        None => format!("state_{}_{}", state.to_lowercase(), event),
    }
}

/// Hooks registered by canonical name, matched against states at build time.
#[derive(Clone, Default)]
pub struct HookTable {
    hooks: BTreeMap<String, Vec<HookFn>>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under a canonical name such as `state_error_entered`.
    pub fn on<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&StateEvent<'_>) + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(hook));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, hook: HookFn) {
        self.hooks.entry(name.into()).or_default().push(hook);
    }

    pub fn get(&self, name: &str) -> &[HookFn] {
        self.hooks.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

/// Merges authored hooks with matching hook-table entries, state by state.
pub(crate) struct HookResolver<'a> {
    table: &'a HookTable,
    matched: BTreeSet<&'a str>,
}

impl<'a> HookResolver<'a> {
    pub(crate) fn new(table: &'a HookTable) -> Self {
        Self {
            table,
            matched: BTreeSet::new(),
        }
    }

    pub(crate) fn resolve(&mut self, state: &str, parent: Option<&str>, authored: &Hooks) -> Hooks {
        let mut hooks = authored.clone();
        for event in HookEvent::ALL {
            let name = hook_name(state, parent, event);
            if let Some((key, found)) = self.table.hooks.get_key_value(&name) {
                self.matched.insert(key.as_str());
                for hook in found {
                    hooks.push(event, Arc::clone(hook));
                }
            }
        }
        hooks
    }

    /// Table entries that matched no state.
    pub(crate) fn unmatched(&self) -> Vec<&'a str> {
        self.table
            .names()
            .filter(|name| !self.matched.contains(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hook_name_uses_double_separator_for_substates() {
        assert_eq!(
            hook_name("FAT_PROCEDURE_1", None, HookEvent::Finished),
            "state_fat_procedure_1_finished"
        );
        assert_eq!(
            hook_name("ERROR", Some("EXECUTE"), HookEvent::Entered),
            "state_execute__error_entered"
        );
    }

    #[test]
    fn resolver_merges_table_entries_with_authored_hooks() {
        let table = HookTable::new()
            .on("state_error_entered", |_| {})
            .on("state_error_exited", |_| {})
            .on("state_missing_entered", |_| {});

        let mut authored = Hooks::default();
        authored.push(HookEvent::Entered, Arc::new(|_| {}));

        let mut resolver = HookResolver::new(&table);
        let hooks = resolver.resolve("ERROR", None, &authored);

        assert_eq!(hooks.get(HookEvent::Entered).len(), 2);
        assert_eq!(hooks.get(HookEvent::Exited).len(), 1);
        assert_eq!(resolver.unmatched(), vec!["state_missing_entered"]);
    }

    #[test]
    fn resolver_ignores_other_states() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let table = HookTable::new().on("state_run__idle_entered", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut resolver = HookResolver::new(&table);
        assert!(resolver.resolve("IDLE", None, &Hooks::default()).is_empty());
        assert!(!resolver.resolve("IDLE", Some("RUN"), &Hooks::default()).is_empty());
        assert!(resolver.unmatched().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn state_log_starts_empty() {
        let log = StateLog::new();
        assert!(log.lines().is_empty());
        assert!(log.last().is_none());
        assert!(!log.is_finished());
    }
}
