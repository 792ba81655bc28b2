//! Session slot state machine.
//!
//! ```text
//!            acquire             connected
//! Unbound ───────────► Connecting ─────────► Bound
//!    ▲                     │                   │
//!    └─────────────────────┴───────────────────┘
//!      cancelled / failed      disconnected / link lost
//! ```

use impterm_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the connection manager's single session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No live session.
    #[default]
    Unbound,

    /// Reconnecting the cached peripheral or discovering a new one.
    Connecting,

    /// Cached peripheral is connected.
    Bound,
}

impl SessionState {
    /// Check whether moving to `next` is a valid transition.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Unbound, Connecting) | (Connecting, Bound) | (Connecting, Unbound) | (Bound, Unbound)
        )
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// allowed.
    pub fn transition(self, next: SessionState) -> impterm_core::Result<SessionState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, SessionState::Bound)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "Unbound"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Bound => write!(f, "Bound"),
        }
    }
}
