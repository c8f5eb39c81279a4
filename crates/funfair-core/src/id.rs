//! Strongly-typed identifiers used throughout the workspace.

use std::fmt;

/// Monotonically increasing simulation tick counter.
///
/// Incremented by exactly 1 each time the simulation advances one
/// fixed-duration step. Never reset except at new-session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick immediately after this one.
    pub fn next(self) -> TickId {
        TickId(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a live entity (guest, vehicle, staff) in the game state.
///
/// Allocated sequentially from the game state's counter. IDs are
/// deterministic: peers executing the same actions at the same ticks
/// allocate identical IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a peer (player connection) in a multiplayer session.
///
/// Assigned by the session authority. Peer order is part of the
/// deterministic action ordering contract: remote actions for a tick
/// are applied in ascending `PeerId` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PeerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
