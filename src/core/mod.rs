//! Core statechart types.
//!
//! This module contains the declarative data model of a statechart:
//! - Identities of catalogs, states and live nodes
//! - State and transition descriptors, grouped into catalogs
//! - Trigger events and edge guards
//! - Hook callbacks and the notification payload
//! - Immutable transition history
//!
//! Nothing here drives a machine; the engine module does that.

mod catalog;
mod descriptor;
mod guard;
mod history;
mod hooks;
mod id;
mod trigger;

pub use catalog::{Catalog, Reach, Scope};
pub use descriptor::{Next, StateDescriptor, Transitions};
pub use guard::{Guard, GuardContext};
pub use history::{StateHistory, StateTransition, TransitionCause};
pub use hooks::{HookEvent, HookFn, Hooks, StateEvent};
pub use id::{CatalogId, NodeId, StateRef};
pub use trigger::{event_name, Trigger, ERROR, STOPPING};
