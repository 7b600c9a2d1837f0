//! Identities for catalogs, states and live nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one instantiated catalog.
///
/// A template reused under several composite states is instantiated once per
/// use; every instance shares the template name and gets its own
/// `instance` discriminator, assigned by the builder in instantiation order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogId {
    template: String,
    instance: u32,
}

impl CatalogId {
    pub fn new(template: impl Into<String>, instance: u32) -> Self {
        Self {
            template: template.into(),
            instance,
        }
    }

    /// Name of the template this catalog was instantiated from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Discriminator among instances of the same template.
    pub fn instance(&self) -> u32 {
        self.instance
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance == 0 {
            write!(f, "{}", self.template)
        } else {
            write!(f, "{}#{}", self.template, self.instance)
        }
    }
}

/// Logical identity of a state: the catalog it belongs to plus its name.
///
/// Names are only unique within one catalog, so the catalog is part of the
/// identity. Two composites reusing the same template have distinct
/// `StateRef`s for their `IDLE` substates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    catalog: CatalogId,
    name: String,
}

impl StateRef {
    pub fn new(catalog: CatalogId, name: impl Into<String>) -> Self {
        Self {
            catalog,
            name: name.into(),
        }
    }

    pub fn catalog(&self) -> &CatalogId {
        &self.catalog
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.name)
    }
}

/// Handle of a live node inside a running engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
