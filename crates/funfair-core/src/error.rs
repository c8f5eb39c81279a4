//! Error types for the action pipeline and network session.

use std::error::Error;
use std::fmt;

use crate::id::TickId;

/// Why an action's `query` or `execute` phase failed.
///
/// These are recoverable, per-action failures: the dispatcher surfaces
/// them in an [`ActionResult`](crate::result::ActionResult) and
/// continues with the rest of the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionError {
    /// The issuer lacks permission (e.g. editor-only action outside
    /// the editor, feature not unlocked).
    PermissionDenied,
    /// A required parameter is missing, has the wrong type, or is out
    /// of range.
    InvalidParameters,
    /// A precondition on the game state no longer holds (target entity
    /// gone, action executed out of phase).
    InvalidGameState,
    /// The action's cost exceeds the available funds.
    InsufficientResources,
    /// A privileged mutation was attempted on a peer that is not the
    /// session authority.
    NotAuthoritative,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::InvalidParameters => write!(f, "invalid parameters"),
            Self::InvalidGameState => write!(f, "invalid game state"),
            Self::InsufficientResources => write!(f, "insufficient funds"),
            Self::NotAuthoritative => write!(f, "not the session authority"),
        }
    }
}

impl Error for ActionError {}

/// Fatal session-level errors.
///
/// Unlike [`ActionError`], these are not recoverable per-action: a
/// desynchronized peer must disconnect and rejoin, since past ticks
/// cannot be retroactively amended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A remote action arrived tagged for a tick that has already
    /// executed locally.
    Desynchronized {
        /// The tick the action was tagged to apply at.
        tagged: TickId,
        /// The local simulation tick when it arrived.
        current: TickId,
    },
    /// The session has already been closed by a prior fatal error or
    /// a connection-closed notification.
    Closed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desynchronized { tagged, current } => write!(
                f,
                "desynchronized: remote action tagged for tick {tagged} arrived at tick {current}"
            ),
            Self::Closed => write!(f, "session is closed"),
        }
    }
}

impl Error for SessionError {}
