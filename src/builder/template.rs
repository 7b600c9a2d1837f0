//! Catalog templates and their instantiation.

use crate::builder::error::BuildError;
use crate::builder::state::StateDecl;
use crate::core::{Catalog, CatalogId, StateDescriptor, StateRef};
use std::collections::HashMap;

/// Reusable shape of one hierarchy level.
///
/// Templates are values: attaching the same template under several
/// composite states gives each composite its own catalog instance, with its
/// own identity and its own parent link.
///
/// # Example
///
/// ```rust
/// use statechart::builder::{CatalogTemplate, StateDecl};
///
/// let procedure = CatalogTemplate::new("Procedure")
///     .state(StateDecl::new("IDLE").initial().next("DONE"))
///     .state(StateDecl::new("DONE").final_state());
///
/// let catalog = CatalogTemplate::new("Main")
///     .state(StateDecl::new("STEP_1").initial().next("STEP_2").sub_states(procedure.clone()))
///     .state(StateDecl::new("STEP_2").next("END").sub_states(procedure))
///     .state(StateDecl::new("END").final_state())
///     .build()
///     .unwrap();
///
/// let first = catalog.get("STEP_1").unwrap().sub_catalog().unwrap();
/// let second = catalog.get("STEP_2").unwrap().sub_catalog().unwrap();
/// assert_ne!(first.id(), second.id());
/// assert_eq!(second.id().to_string(), "Procedure#1");
/// ```
#[derive(Clone, Debug)]
pub struct CatalogTemplate {
    name: String,
    states: Vec<StateDecl>,
}

impl CatalogTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
        }
    }

    /// Append a state declaration.
    pub fn state(mut self, decl: StateDecl) -> Self {
        self.states.push(decl);
        self
    }

    /// Append several state declarations.
    pub fn states(mut self, decls: impl IntoIterator<Item = StateDecl>) -> Self {
        self.states.extend(decls);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decls(&self) -> &[StateDecl] {
        &self.states
    }

    /// Copy of this template under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: self.states.clone(),
        }
    }

    /// Instantiate this template as a top-level catalog.
    ///
    /// Nested templates are instantiated recursively; every template name
    /// gets instance discriminators 0, 1, 2... in depth-first order.
    pub fn build(&self) -> Result<Catalog, BuildError> {
        Instantiator::default().instantiate(self, None)
    }
}

/// Assigns catalog identities during one build.
#[derive(Default)]
struct Instantiator {
    instances: HashMap<String, u32>,
}

impl Instantiator {
    fn next_id(&mut self, template: &str) -> CatalogId {
        let counter = self.instances.entry(template.to_string()).or_insert(0);
        let id = CatalogId::new(template, *counter);
        *counter += 1;
        id
    }

    fn instantiate(
        &mut self,
        template: &CatalogTemplate,
        parent: Option<StateRef>,
    ) -> Result<Catalog, BuildError> {
        if template.states.is_empty() {
            return Err(BuildError::EmptyTemplate {
                template: template.name.clone(),
            });
        }

        let id = self.next_id(&template.name);
        let mut states = Vec::with_capacity(template.states.len());

        for decl in &template.states {
            let sub_catalog = match &decl.sub {
                Some(sub) => {
                    let owner = StateRef::new(id.clone(), decl.name.clone());
                    Some(self.instantiate(sub, Some(owner))?)
                }
                None => None,
            };

            states.push(StateDescriptor {
                name: decl.name.clone(),
                transitions: decl.transitions.clone(),
                sub_catalog,
                initial: decl.initial,
                is_final: decl.is_final,
                parent: parent.clone(),
                hooks: decl.hooks.clone(),
            });
        }

        Ok(Catalog { id, parent, states })
    }
}
