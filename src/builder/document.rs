//! Catalogs described as data.
//!
//! A [`CatalogDocument`] names a root template and lists every template as
//! an ordered array of states. Sub-states refer to other templates by name;
//! `StandardStates` is always available without being listed.
//!
//! ```json
//! {
//!   "root": "Calibration",
//!   "templates": {
//!     "Calibration": [
//!       { "name": "CALIBRATION_1", "initial": true, "next": "CALIBRATION_2",
//!         "sub_states": "StandardStates" },
//!       { "name": "CALIBRATION_2", "next": "DONE", "sub_states": "StandardStates" },
//!       { "name": "DONE", "final": true }
//!     ]
//!   }
//! }
//! ```

use crate::builder::error::BuildError;
use crate::builder::standard::{standard_states, STANDARD_TEMPLATE};
use crate::builder::state::StateDecl;
use crate::builder::template::CatalogTemplate;
use crate::core::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `next` as written in a document: one name or a list of alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextSpec {
    Single(String),
    Options(Vec<String>),
}

/// One state entry of a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,
    #[serde(default)]
    pub initial: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    /// Name of the template instantiated below this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_states: Option<String>,
}

/// Serializable description of a whole catalog tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub root: String,
    pub templates: BTreeMap<String, Vec<StateSpec>>,
}

impl CatalogDocument {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::Document(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BuildError> {
        serde_json::to_string_pretty(self).map_err(|e| BuildError::Document(e.to_string()))
    }

    /// Resolve `name` and every template it nests into a [`CatalogTemplate`].
    pub fn template(&self, name: &str) -> Result<CatalogTemplate, BuildError> {
        self.resolve(name, &mut Vec::new())
    }

    /// Instantiate the root template.
    pub fn build(&self) -> Result<Catalog, BuildError> {
        self.template(&self.root)?.build()
    }

    fn resolve(&self, name: &str, stack: &mut Vec<String>) -> Result<CatalogTemplate, BuildError> {
        if stack.iter().any(|open| open == name) {
            return Err(BuildError::RecursiveTemplate {
                name: name.to_string(),
            });
        }

        let Some(specs) = self.templates.get(name) else {
            if name == STANDARD_TEMPLATE {
                return Ok(standard_states());
            }
            return Err(BuildError::UnknownTemplate {
                name: name.to_string(),
            });
        };

        stack.push(name.to_string());
        let mut template = CatalogTemplate::new(name);
        for spec in specs {
            template = template.state(self.declare(spec, stack)?);
        }
        stack.pop();
        Ok(template)
    }

    fn declare(&self, spec: &StateSpec, stack: &mut Vec<String>) -> Result<StateDecl, BuildError> {
        let mut decl = StateDecl::new(spec.name.clone());
        if spec.initial {
            decl = decl.initial();
        }
        if spec.is_final {
            decl = decl.final_state();
        }
        decl = match &spec.next {
            Some(NextSpec::Single(target)) => decl.next(target.clone()),
            Some(NextSpec::Options(targets)) => decl.options(targets.iter().cloned()),
            None => decl,
        };
        if let Some(prev) = &spec.prev {
            decl = decl.prev(prev.clone());
        }
        if !spec.optional.is_empty() {
            decl = decl.optional(spec.optional.iter().cloned());
        }
        if let Some(sub) = &spec.sub_states {
            decl = decl.sub_states(self.resolve(sub, stack)?);
        }
        Ok(decl)
    }
}
