//! Builder API for catalogs and engines.
//!
//! Catalogs are authored as [`CatalogTemplate`]s made of [`StateDecl`]s,
//! either in code or from a [`CatalogDocument`], then instantiated with
//! [`CatalogTemplate::build`]. An [`EngineBuilder`] turns an instantiated
//! catalog into a running [`Engine`](crate::engine::Engine).

pub mod document;
pub mod error;
pub mod machine;
pub mod standard;
pub mod state;
pub mod template;

pub use document::{CatalogDocument, NextSpec, StateSpec};
pub use error::BuildError;
pub use machine::EngineBuilder;
pub use standard::{guarded_standard_states, standard_states, STANDARD_TEMPLATE};
pub use state::StateDecl;
pub use template::CatalogTemplate;

/// A linear template: each state steps to the following one and the last
/// one is final.
///
/// # Example
///
/// ```
/// use statechart::builder::linear;
///
/// let catalog = linear("Steps", ["ONE", "TWO", "DONE"]).build().unwrap();
/// assert_eq!(catalog.initial().unwrap().name(), "ONE");
/// assert!(catalog.get("DONE").unwrap().is_final());
/// ```
pub fn linear<I, T>(name: &str, states: I) -> CatalogTemplate
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let names: Vec<String> = states.into_iter().map(Into::into).collect();
    let mut template = CatalogTemplate::new(name);
    for (position, state) in names.iter().enumerate() {
        let mut decl = StateDecl::new(state.clone());
        if position == 0 {
            decl = decl.initial();
        }
        decl = match names.get(position + 1) {
            Some(next) => decl.next(next.clone()),
            None => decl.final_state(),
        };
        template = template.state(decl);
    }
    template
}
