//! Trigger events fed into the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the control state every engine can jump to with [`Trigger::stop`].
pub const STOPPING: &str = "STOPPING";

/// Name of the control state every engine can jump to with [`Trigger::error`].
pub const ERROR: &str = "ERROR";

/// An event that may cause a transition.
///
/// `Next`, `Previous` and `Option` follow the linear chain declared in the
/// catalog; `Named` events drive jumps to optional targets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Default forward step.
    Next,

    /// Reverse step back to the state that sent the machine here, or to the
    /// declared previous override.
    Previous,

    /// Pick one of several forward alternatives by position and name.
    Option { index: usize, name: String },

    /// Named jump event, always of the form `to_<lowercased target>`.
    Named(String),
}

impl Trigger {
    /// Named jump to `target`.
    ///
    /// ```rust
    /// use statechart::Trigger;
    ///
    /// assert_eq!(Trigger::jump("ABORTING"), Trigger::Named("to_aborting".to_string()));
    /// ```
    pub fn jump(target: &str) -> Self {
        Self::Named(event_name(target))
    }

    pub fn option(index: usize, name: impl Into<String>) -> Self {
        Self::Option {
            index,
            name: name.into(),
        }
    }

    pub fn stop() -> Self {
        Self::jump(STOPPING)
    }

    pub fn error() -> Self {
        Self::jump(ERROR)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
            Self::Option { index, name } => write!(f, "option({index}, {name})"),
            Self::Named(event) => write!(f, "{event}"),
        }
    }
}

/// Derive the named event that jumps to `target`.
pub fn event_name(target: &str) -> String {
    format!("to_{}", target.to_lowercase())
}
