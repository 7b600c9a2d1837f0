//! Statechart: a hierarchical state machine engine
//!
//! Machines are described as catalogs of named states. A state may own a
//! sub-catalog, which turns it into a composite whose body is another
//! machine; exactly one state is active per level, and the innermost one is
//! the current state. Catalogs are validated up front, so a machine that
//! builds has every reference resolved.
//!
//! # Core Concepts
//!
//! - **Catalogs**: ordered state declarations, authored as reusable
//!   templates and instantiated with their own identity per use
//! - **Transitions**: `next` (linear or a list of options), `previous`
//!   (back to the state the machine arrived from, or an override) and named
//!   jumps `to_<state>` for optional targets such as `ERROR`
//! - **Bubbling**: a trigger the current leaf cannot handle is offered to
//!   each enclosing composite in turn
//! - **Observers and hooks**: entered, exited and finished notifications,
//!   for every state or for one state by canonical hook name
//! - **Relocation**: jump anywhere without following edges, for resuming
//!   from a [`checkpoint`]
//!
//! # Example
//!
//! ```rust
//! use statechart::builder::{standard_states, CatalogTemplate, StateDecl};
//! use statechart::engine::Engine;
//!
//! let catalog = CatalogTemplate::new("Calibration")
//!     .state(
//!         StateDecl::new("CALIBRATION_1")
//!             .initial()
//!             .next("CALIBRATION_2")
//!             .sub_states(standard_states()),
//!     )
//!     .state(
//!         StateDecl::new("CALIBRATION_2")
//!             .next("DONE")
//!             .sub_states(standard_states()),
//!     )
//!     .state(StateDecl::new("DONE").final_state())
//!     .build()
//!     .unwrap();
//!
//! let mut engine = Engine::builder(catalog).build().unwrap();
//! assert_eq!(engine.current_path_string(), "CALIBRATION_1.IDLE");
//!
//! // IDLE -> STARTING -> EXECUTE -> COMPLETE, then COMPLETE has no edge of
//! // its own and the composite moves on.
//! for _ in 0..4 {
//!     engine.next();
//! }
//! assert_eq!(engine.current_path_string(), "CALIBRATION_2.IDLE");
//!
//! engine.error();
//! assert_eq!(engine.current_path_string(), "CALIBRATION_2.ERROR");
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod driver;
pub mod engine;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, CatalogTemplate, StateDecl};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{HookEvent, StateEvent, StateRef, Trigger};
pub use engine::{Dispatch, Engine, EngineError, Observer};
