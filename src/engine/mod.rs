//! The runtime: edge wiring, dispatch, and notifications.
//!
//! An [`Engine`] is built from an instantiated [`Catalog`](crate::core::Catalog)
//! through [`Engine::builder`]. Building validates the catalog, assigns a
//! [`NodeId`](crate::core::NodeId) to every state, wires the transition rules
//! into an [`EdgeTable`] and enters the initial configuration.

mod index;
mod machine;
mod observer;
mod triggers;
mod wiring;

pub use index::StateIndex;
pub use machine::{Dispatch, Engine, EngineError};
pub use observer::{hook_name, HookTable, Observer, StateLog};
pub use triggers::TriggerSet;
pub use wiring::{Edge, EdgeEvent, EdgeTable};
