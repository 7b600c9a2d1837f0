//! Built-in catalog templates.

use crate::builder::state::StateDecl;
use crate::builder::template::CatalogTemplate;
use crate::core::{ERROR, STOPPING};

/// Name of the template returned by [`standard_states`].
pub const STANDARD_TEMPLATE: &str = "StandardStates";

/// The standard procedure sub-machine.
///
/// `IDLE → STARTING → EXECUTE → COMPLETE`, plus the control states
/// `STOPPING → STOPPED`, `ABORTING → ABORTED → RESETTING → IDLE` and `ERROR`.
/// `COMPLETE` is not final and has no outgoing edges, so a `next` issued
/// there bubbles up to the composite state that owns this sub-machine.
///
/// Every state can jump to `ERROR`; the operational states can also jump to
/// `STOPPING`.
pub fn standard_states() -> CatalogTemplate {
    CatalogTemplate::new(STANDARD_TEMPLATE).states([
        StateDecl::new("IDLE")
            .initial()
            .next("STARTING")
            .optional([STOPPING, ERROR]),
        StateDecl::new("STARTING")
            .next("EXECUTE")
            .optional([STOPPING, ERROR]),
        StateDecl::new("EXECUTE")
            .next("COMPLETE")
            .optional([STOPPING, ERROR]),
        StateDecl::new("COMPLETE"),
        StateDecl::new(STOPPING).next("STOPPED").optional([ERROR]),
        StateDecl::new("STOPPED").next("STARTING").optional([ERROR]),
        StateDecl::new("ABORTING").next("ABORTED").optional([ERROR]),
        StateDecl::new("ABORTED").next("RESETTING").optional([ERROR]),
        StateDecl::new("RESETTING").next("IDLE").optional([ERROR]),
        StateDecl::new(ERROR).next("RESETTING").optional([ERROR]),
    ])
}

/// [`standard_states`] with reverse navigation pinned on control states.
///
/// `IDLE` and the entry points of the control sequences declare themselves
/// as their own previous state, which disables `previous` there; `ERROR`
/// always goes back to `RESETTING`.
pub fn guarded_standard_states() -> CatalogTemplate {
    CatalogTemplate::new(STANDARD_TEMPLATE).states([
        StateDecl::new("IDLE")
            .initial()
            .next("STARTING")
            .optional([STOPPING, ERROR])
            .prev("IDLE"),
        StateDecl::new("STARTING")
            .next("EXECUTE")
            .optional([STOPPING, ERROR]),
        StateDecl::new("EXECUTE")
            .next("COMPLETE")
            .optional([STOPPING, ERROR]),
        StateDecl::new("COMPLETE"),
        StateDecl::new(STOPPING)
            .next("STOPPED")
            .optional([ERROR])
            .prev(STOPPING),
        StateDecl::new("STOPPED").next("IDLE").optional([ERROR]),
        StateDecl::new("ABORTING")
            .next("ABORTED")
            .optional([ERROR])
            .prev("ABORTING"),
        StateDecl::new("ABORTED").next("RESETTING").optional([ERROR]),
        StateDecl::new("RESETTING")
            .next("IDLE")
            .optional([ERROR])
            .prev("RESETTING"),
        StateDecl::new(ERROR)
            .next("RESETTING")
            .optional([ERROR])
            .prev("RESETTING"),
    ])
}
