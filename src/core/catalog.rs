//! Instantiated catalogs and scoped name resolution.

use super::descriptor::StateDescriptor;
use super::id::{CatalogId, StateRef};

/// One level of the state hierarchy: an ordered list of state descriptors.
///
/// Catalogs are produced by [`CatalogTemplate::build`](crate::builder::CatalogTemplate::build)
/// and are immutable afterwards.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub(crate) id: CatalogId,
    pub(crate) parent: Option<StateRef>,
    pub(crate) states: Vec<StateDescriptor>,
}

impl Catalog {
    pub fn id(&self) -> &CatalogId {
        &self.id
    }

    /// The composite state this catalog is attached under.
    pub fn parent(&self) -> Option<&StateRef> {
        self.parent.as_ref()
    }

    pub fn states(&self) -> &[StateDescriptor] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StateDescriptor> {
        self.states.iter().find(|state| state.name == name)
    }

    /// First state flagged initial.
    pub fn initial(&self) -> Option<&StateDescriptor> {
        self.states.iter().find(|state| state.initial)
    }

    /// Identity of the state called `name` in this catalog.
    pub fn state_ref(&self, name: &str) -> Option<StateRef> {
        self.get(name)
            .map(|state| StateRef::new(self.id.clone(), state.name.clone()))
    }

    /// Follow a path of names from this catalog down through sub-catalogs.
    pub fn find_path(&self, path: &[&str]) -> Option<&StateDescriptor> {
        let (first, rest) = path.split_first()?;
        let state = self.get(first)?;
        if rest.is_empty() {
            return Some(state);
        }
        state.sub_catalog.as_ref()?.find_path(rest)
    }

    /// Total number of states, nested ones included.
    pub fn total_states(&self) -> usize {
        self.states
            .iter()
            .map(|state| 1 + state.sub_catalog.as_ref().map_or(0, Catalog::total_states))
            .sum()
    }
}

/// Where a name was found by [`Scope::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reach {
    /// Same catalog level as the referring state.
    Sibling,
    /// The enclosing catalog level.
    Enclosing,
}

/// Name-resolution scope of a state: its own catalog level, and the level
/// that contains the composite owning it.
#[derive(Clone, Copy, Debug)]
pub struct Scope<'a> {
    level: &'a Catalog,
    enclosing: Option<&'a Catalog>,
}

impl<'a> Scope<'a> {
    pub fn new(level: &'a Catalog, enclosing: Option<&'a Catalog>) -> Self {
        Self { level, enclosing }
    }

    pub fn level(&self) -> &'a Catalog {
        self.level
    }

    /// Look `name` up among siblings, then in the enclosing level.
    pub fn resolve(&self, name: &str) -> Option<(Reach, &'a Catalog, &'a StateDescriptor)> {
        if let Some(state) = self.level.get(name) {
            return Some((Reach::Sibling, self.level, state));
        }
        let enclosing = self.enclosing?;
        enclosing
            .get(name)
            .map(|state| (Reach::Enclosing, enclosing, state))
    }

    /// Look `name` up among siblings only.
    pub fn resolve_sibling(&self, name: &str) -> Option<&'a StateDescriptor> {
        self.level.get(name)
    }
}
