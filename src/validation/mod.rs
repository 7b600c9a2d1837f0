//! Eager validation of catalogs before an engine is built.
//!
//! Uses Stillwater's `Validation` type to accumulate ALL violations instead
//! of failing fast, so an author sees every broken reference of a catalog
//! in one pass.
//!
//! # Example
//!
//! ```rust
//! use statechart::builder::{CatalogTemplate, StateDecl};
//! use statechart::engine::TriggerSet;
//! use statechart::validation::validate;
//!
//! let catalog = CatalogTemplate::new("Main")
//!     .state(StateDecl::new("IDLE").initial().next("MISSING"))
//!     .build()
//!     .unwrap();
//!
//! assert!(validate(&catalog, &TriggerSet::default()).is_failure());
//! ```

pub mod rules;
pub mod violations;

pub use rules::{validate, Check};
pub use violations::{ConfigError, EdgeKind, MAX_DEPTH};
