//! The [`Action`] data model: the sole unit of simulation state mutation.
//!
//! Every gameplay change is expressed as an `Action` — a self-describing
//! command with a stable wire tag, a keyed parameter map, and a set of
//! behavioral flags. Actions are constructed by the UI, scripts, or the
//! network layer, validated (`query`), and then executed by the
//! dispatcher. An action is immutable once constructed.
//!
//! # Wire stability
//!
//! [`ActionKind`] discriminants are transmitted between peers and stored
//! in replays. They are append-only: never renumber an existing kind.

use std::fmt;

use indexmap::IndexMap;

use crate::error::ActionError;
use crate::id::{EntityId, PeerId};

// ── ActionKind ───────────────────────────────────────────────────

/// Closed set of command kinds, each with a stable `u16` wire tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ActionKind {
    /// Spawn a guest entity at a map position.
    SpawnGuest = 0,
    /// Move an existing entity to a map position.
    MoveEntity = 1,
    /// Remove an existing entity.
    RemoveEntity = 2,
    /// Place an attraction, deducting its cost from park funds.
    PlaceAttraction = 3,
    /// Pause or unpause the simulation. Replicated like any other
    /// action so every peer pauses on the same tick.
    SetPaused = 4,
    /// Adjust park funds directly. Cheat; requires session authority.
    AdjustFunds = 5,
    /// Place a scenario object. Only valid on the editor screen.
    EditorPlaceObject = 6,
    /// Request an orderly session shutdown. Local UI intent; never
    /// replicated, replayed, or checksummed.
    RequestExit = 7,
}

impl ActionKind {
    /// The stable wire tag for this kind.
    pub fn wire_tag(self) -> u16 {
        self as u16
    }

    /// The capability flags for this kind.
    ///
    /// Flags are a property of the kind, not of individual action
    /// instances, so the dispatcher and the replay recorder agree on
    /// them without consulting each other.
    pub fn flags(self) -> ActionFlags {
        match self {
            Self::SpawnGuest
            | Self::MoveEntity
            | Self::RemoveEntity
            | Self::PlaceAttraction
            | Self::SetPaused => ActionFlags::NONE,
            Self::AdjustFunds => ActionFlags::REQUIRES_AUTHORITY,
            Self::EditorPlaceObject => ActionFlags::EDITOR_ONLY,
            Self::RequestExit => ActionFlags::LOCAL_ONLY
                .union(ActionFlags::NO_CHECKSUM)
                .union(ActionFlags::NOT_REPLAYABLE),
        }
    }

    /// Decode a wire tag back into a kind.
    ///
    /// Returns `None` for tags this build does not know, which a caller
    /// should surface as [`ActionError::InvalidParameters`].
    pub fn from_wire_tag(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Self::SpawnGuest),
            1 => Some(Self::MoveEntity),
            2 => Some(Self::RemoveEntity),
            3 => Some(Self::PlaceAttraction),
            4 => Some(Self::SetPaused),
            5 => Some(Self::AdjustFunds),
            6 => Some(Self::EditorPlaceObject),
            7 => Some(Self::RequestExit),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpawnGuest => "spawn-guest",
            Self::MoveEntity => "move-entity",
            Self::RemoveEntity => "remove-entity",
            Self::PlaceAttraction => "place-attraction",
            Self::SetPaused => "set-paused",
            Self::AdjustFunds => "adjust-funds",
            Self::EditorPlaceObject => "editor-place-object",
            Self::RequestExit => "request-exit",
        };
        write!(f, "{name}")
    }
}

// ── ActionFlags ──────────────────────────────────────────────────

/// Per-kind capability flags governing dispatcher behavior.
///
/// A small fixed bit set, stable on the wire alongside the kind tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ActionFlags(pub u16);

impl ActionFlags {
    /// No flags set.
    pub const NONE: ActionFlags = ActionFlags(0);
    /// Must be authorized by the session authority; followers reject
    /// it locally with `NotAuthoritative`.
    pub const REQUIRES_AUTHORITY: ActionFlags = ActionFlags(1 << 0);
    /// Only valid while the editor screen is active.
    pub const EDITOR_ONLY: ActionFlags = ActionFlags(1 << 1);
    /// Exempt from checksum comparison (the tick it executes in
    /// records a zero checksum).
    pub const NO_CHECKSUM: ActionFlags = ActionFlags(1 << 2);
    /// Never leaves the local peer; no network round-trip.
    pub const LOCAL_ONLY: ActionFlags = ActionFlags(1 << 3);
    /// Excluded from replay recordings.
    pub const NOT_REPLAYABLE: ActionFlags = ActionFlags(1 << 4);

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(self, other: ActionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    pub fn union(self, other: ActionFlags) -> ActionFlags {
        ActionFlags(self.0 | other.0)
    }
}

// ── Parameters ───────────────────────────────────────────────────

/// Key for a named action parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamKey(pub u16);

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known parameter keys. Stable on the wire, append-only.
pub mod keys {
    use super::ParamKey;

    /// Map X coordinate.
    pub const X: ParamKey = ParamKey(0);
    /// Map Y coordinate.
    pub const Y: ParamKey = ParamKey(1);
    /// Map Z coordinate.
    pub const Z: ParamKey = ParamKey(2);
    /// Target entity.
    pub const ENTITY: ParamKey = ParamKey(3);
    /// Boolean pause state.
    pub const PAUSED: ParamKey = ParamKey(4);
    /// Signed funds delta in cents.
    pub const AMOUNT: ParamKey = ParamKey(5);
    /// Attraction type identifier.
    pub const ATTRACTION: ParamKey = ParamKey(6);
    /// Editor object type identifier.
    pub const OBJECT: ParamKey = ParamKey(7);
}

/// A typed parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// Signed 32-bit integer (coordinates, type ids).
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 64-bit integer (funds).
    I64(i64),
    /// Boolean.
    Bool(bool),
    /// Entity reference.
    Entity(EntityId),
}

/// Keyed parameter mapping for an action.
///
/// Backed by an `IndexMap` so iteration (and therefore serialization
/// and hashing) follows insertion order deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ActionParams(pub IndexMap<ParamKey, ParamValue>);

impl ActionParams {
    /// An empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any existing value for the key.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        self.0.insert(key, value);
    }

    /// Fetch an `i32` parameter.
    pub fn i32(&self, key: ParamKey) -> Result<i32, ActionError> {
        match self.0.get(&key) {
            Some(ParamValue::I32(v)) => Ok(*v),
            _ => Err(ActionError::InvalidParameters),
        }
    }

    /// Fetch an `i64` parameter.
    pub fn i64(&self, key: ParamKey) -> Result<i64, ActionError> {
        match self.0.get(&key) {
            Some(ParamValue::I64(v)) => Ok(*v),
            _ => Err(ActionError::InvalidParameters),
        }
    }

    /// Fetch a `bool` parameter.
    pub fn bool(&self, key: ParamKey) -> Result<bool, ActionError> {
        match self.0.get(&key) {
            Some(ParamValue::Bool(v)) => Ok(*v),
            _ => Err(ActionError::InvalidParameters),
        }
    }

    /// Fetch an entity parameter.
    pub fn entity(&self, key: ParamKey) -> Result<EntityId, ActionError> {
        match self.0.get(&key) {
            Some(ParamValue::Entity(v)) => Ok(*v),
            _ => Err(ActionError::InvalidParameters),
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Action ───────────────────────────────────────────────────────

/// One atomic, validated state mutation.
///
/// Constructed by a caller (UI, script, or network message), validated
/// by the dispatcher (`query`), then optionally executed. Immutable
/// once constructed; the computed cost lives in the
/// [`ActionResult`](crate::result::ActionResult), not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    /// The command kind.
    pub kind: ActionKind,
    /// Named parameters.
    pub params: ActionParams,
    /// The peer that issued this action. `None` for actions originated
    /// by the local session itself (e.g. scripted scenario steps).
    pub issuer: Option<PeerId>,
}

impl Action {
    /// Build an action with no parameters.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            params: ActionParams::new(),
            issuer: None,
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: ParamKey, value: ParamValue) -> Self {
        self.params.set(key, value);
        self
    }

    /// Builder-style issuer assignment.
    pub fn with_issuer(mut self, peer: PeerId) -> Self {
        self.issuer = Some(peer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_are_stable() {
        // Frozen wire contract: renumbering breaks replays and network
        // compatibility.
        assert_eq!(ActionKind::SpawnGuest.wire_tag(), 0);
        assert_eq!(ActionKind::MoveEntity.wire_tag(), 1);
        assert_eq!(ActionKind::RemoveEntity.wire_tag(), 2);
        assert_eq!(ActionKind::PlaceAttraction.wire_tag(), 3);
        assert_eq!(ActionKind::SetPaused.wire_tag(), 4);
        assert_eq!(ActionKind::AdjustFunds.wire_tag(), 5);
        assert_eq!(ActionKind::EditorPlaceObject.wire_tag(), 6);
        assert_eq!(ActionKind::RequestExit.wire_tag(), 7);
    }

    #[test]
    fn wire_tag_round_trips() {
        for tag in 0..=7u16 {
            let kind = ActionKind::from_wire_tag(tag).unwrap();
            assert_eq!(kind.wire_tag(), tag);
        }
    }

    #[test]
    fn unknown_wire_tag_is_rejected() {
        assert_eq!(ActionKind::from_wire_tag(999), None);
    }

    #[test]
    fn kind_flag_table() {
        assert_eq!(ActionKind::SpawnGuest.flags(), ActionFlags::NONE);
        assert!(ActionKind::AdjustFunds
            .flags()
            .contains(ActionFlags::REQUIRES_AUTHORITY));
        assert!(ActionKind::EditorPlaceObject
            .flags()
            .contains(ActionFlags::EDITOR_ONLY));
        // Pause replicates and replays like any gameplay action; a
        // locally paused peer must not silently diverge.
        assert_eq!(ActionKind::SetPaused.flags(), ActionFlags::NONE);
        let exit = ActionKind::RequestExit.flags();
        assert!(exit.contains(ActionFlags::LOCAL_ONLY));
        assert!(exit.contains(ActionFlags::NO_CHECKSUM));
        assert!(exit.contains(ActionFlags::NOT_REPLAYABLE));
    }

    #[test]
    fn flags_contains_and_union() {
        let flags = ActionFlags::REQUIRES_AUTHORITY.union(ActionFlags::NO_CHECKSUM);
        assert!(flags.contains(ActionFlags::REQUIRES_AUTHORITY));
        assert!(flags.contains(ActionFlags::NO_CHECKSUM));
        assert!(!flags.contains(ActionFlags::EDITOR_ONLY));
        assert!(flags.contains(ActionFlags::NONE));
    }

    #[test]
    fn typed_getters_enforce_type() {
        let action = Action::new(ActionKind::MoveEntity)
            .with_param(keys::X, ParamValue::I32(10))
            .with_param(keys::ENTITY, ParamValue::Entity(EntityId(3)));

        assert_eq!(action.params.i32(keys::X), Ok(10));
        assert_eq!(action.params.entity(keys::ENTITY), Ok(EntityId(3)));
        // Wrong type and missing key both surface InvalidParameters.
        assert_eq!(
            action.params.bool(keys::X),
            Err(ActionError::InvalidParameters)
        );
        assert_eq!(
            action.params.i32(keys::Y),
            Err(ActionError::InvalidParameters)
        );
    }

    #[test]
    fn params_iterate_in_insertion_order() {
        let mut params = ActionParams::new();
        params.set(keys::Z, ParamValue::I32(3));
        params.set(keys::X, ParamValue::I32(1));
        params.set(keys::Y, ParamValue::I32(2));
        let order: Vec<ParamKey> = params.0.keys().copied().collect();
        assert_eq!(order, vec![keys::Z, keys::X, keys::Y]);
    }
}
