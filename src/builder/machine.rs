//! Builder for constructing engines.

use crate::builder::error::BuildError;
use crate::core::Catalog;
use crate::engine::{Engine, HookTable, Observer, TriggerSet};

/// Builder for a running [`Engine`] with a fluent API.
///
/// Observers are notified in registration order, before the per-state hooks.
pub struct EngineBuilder {
    catalog: Catalog,
    observers: Vec<Box<dyn Observer>>,
    triggers: TriggerSet,
    hooks: HookTable,
}

impl EngineBuilder {
    /// Create a new builder over an instantiated catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            observers: Vec::new(),
            triggers: TriggerSet::default(),
            hooks: HookTable::new(),
        }
    }

    /// Register a generic observer.
    pub fn observer<O: Observer + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Declare the `to_<target>` event in addition to the defaults.
    pub fn trigger_target(mut self, target: &str) -> Self {
        self.triggers.insert_target(target);
        self
    }

    /// Replace the whole set of named events.
    pub fn triggers(mut self, triggers: TriggerSet) -> Self {
        self.triggers = triggers;
        self
    }

    /// Attach hooks by canonical name.
    pub fn hooks(mut self, hooks: HookTable) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validate the catalog, wire it and enter the initial configuration.
    ///
    /// Every configuration violation is collected into
    /// [`BuildError::InvalidCatalog`]; nothing is notified unless the
    /// catalog is valid.
    pub fn build(self) -> Result<Engine, BuildError> {
        Engine::construct(self.catalog, self.observers, self.triggers, self.hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{standard_states, CatalogTemplate, StateDecl};
    use crate::validation::ConfigError;

    #[test]
    fn builder_declares_extra_trigger_targets() {
        let catalog = CatalogTemplate::new("Main")
            .state(StateDecl::new("RUNNING").initial().optional(["ABORTING"]))
            .state(StateDecl::new("ABORTING"))
            .build()
            .unwrap();

        let rejected = EngineBuilder::new(catalog.clone()).build().unwrap_err();
        assert!(matches!(
            rejected.primary(),
            Some(ConfigError::MissingTrigger { event, .. }) if event == "to_aborting"
        ));

        let engine = EngineBuilder::new(catalog)
            .trigger_target("ABORTING")
            .build()
            .unwrap();
        assert!(engine.triggers().contains("to_aborting"));
    }

    #[test]
    fn empty_trigger_set_rejects_error_targets() {
        let catalog = CatalogTemplate::new("Main")
            .state(StateDecl::new("RUNNING").initial().optional(["ERROR"]))
            .state(StateDecl::new("ERROR"))
            .build()
            .unwrap();

        let result = EngineBuilder::new(catalog)
            .triggers(TriggerSet::empty())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn standard_states_build_with_default_triggers() {
        let catalog = standard_states().build().unwrap();
        let engine = EngineBuilder::new(catalog).build().unwrap();
        assert_eq!(engine.current_state_ref().name(), "IDLE");
    }
}
