//! The authoritative game state and its checksum.
//!
//! `GameState` is the single object all actions mutate. Every field
//! that affects gameplay is covered by [`GameState::checksum()`], which
//! peers compare to detect desynchronization. Render-only data
//! (`Entity::draw_position`) is deliberately excluded: it may differ
//! between peers (and between frames on one peer) without the
//! simulations having diverged.

use indexmap::IndexMap;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use funfair_core::hash::{fnv1a_i32, fnv1a_i64, fnv1a_u32, fnv1a_u64, FNV_OFFSET};
use funfair_core::id::EntityId;

/// Map edge length in tiles. Coordinates must lie in `0..MAP_SIZE`.
pub const MAP_SIZE: i32 = 256;

/// Maximum valid Z coordinate.
pub const MAX_HEIGHT: i32 = 64;

/// In-game ticks per park day.
pub const TICKS_PER_DAY: u32 = 14_400;

/// Ticks the intro sequence runs before handing over to the title
/// screen.
pub const INTRO_TICKS: u32 = 120;

// ── Positions and entities ───────────────────────────────────────

/// A 3D map position in tile units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Pos3 {
    /// East-west coordinate.
    pub x: i32,
    /// North-south coordinate.
    pub y: i32,
    /// Height.
    pub z: i32,
}

impl Pos3 {
    /// Construct a position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Whether the position lies inside the map bounds.
    pub fn in_bounds(self) -> bool {
        (0..MAP_SIZE).contains(&self.x)
            && (0..MAP_SIZE).contains(&self.y)
            && (0..=MAX_HEIGHT).contains(&self.z)
    }
}

/// A simulated entity (guest, staff, attraction marker).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    /// Stable identity.
    pub id: EntityId,
    /// Authoritative position. Written only inside a tick.
    pub position: Pos3,
    /// Render-time position. The tweener's output; never checksummed,
    /// never serialized.
    pub draw_position: Pos3,
    /// Facing direction, 0..8.
    pub heading: u8,
}

impl Entity {
    /// Authoritatively move the entity. Keeps the draw position in
    /// lockstep so non-interpolated rendering stays correct.
    pub fn set_position(&mut self, pos: Pos3) {
        self.position = pos;
        self.draw_position = pos;
    }
}

// ── Screen mode and date ─────────────────────────────────────────

/// Which top-level screen the tick services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenMode {
    /// Startup intro sequence.
    Intro,
    /// Title screen demo.
    Title,
    /// Normal gameplay.
    InGame,
    /// Scenario editor.
    Editor,
}

impl ScreenMode {
    /// Whether the main game-state step runs on this screen.
    pub fn runs_game_step(self) -> bool {
        matches!(self, Self::InGame | Self::Editor)
    }
}

/// The in-game calendar, advanced exactly once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GameDate {
    /// Days elapsed since the scenario started.
    pub day: u32,
    /// Tick within the current day, `0..TICKS_PER_DAY`.
    pub tick_of_day: u32,
}

impl GameDate {
    /// Advance by one tick, rolling the day over at the boundary.
    pub fn advance(&mut self) {
        self.tick_of_day += 1;
        if self.tick_of_day >= TICKS_PER_DAY {
            self.tick_of_day = 0;
            self.day += 1;
        }
    }
}

// ── GameState ────────────────────────────────────────────────────

/// The complete authoritative simulation state.
///
/// Constructed once per session from the session seed; replaced
/// wholesale (between ticks) when a park file is loaded.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Live entities in spawn order. `IndexMap` keeps iteration
    /// deterministic, which the wander step and checksum rely on.
    pub entities: IndexMap<EntityId, Entity>,
    /// Park funds in cents.
    pub funds: i64,
    /// Park rating, 0..=999.
    pub park_rating: u16,
    /// Whether gameplay simulation is paused.
    pub paused: bool,
    /// Current top-level screen.
    pub screen: ScreenMode,
    /// In-game calendar.
    pub date: GameDate,
    /// Progress counter for the intro sequence.
    pub intro_progress: u32,
    /// Deterministic delta-time (ms) gameplay systems read during a
    /// tick. Always one fixed tick, set by the scheduler.
    pub delta_ms: u32,
    /// Set by an exit-request action and read by the scheduler. Local
    /// UI intent, so it is never checksummed.
    pub exit_requested: bool,
    seed: u64,
    next_entity: u32,
    rng: ChaCha8Rng,
}

impl GameState {
    /// Build a fresh state from a session seed.
    pub fn new(seed: u64, starting_funds: i64, screen: ScreenMode) -> Self {
        Self {
            entities: IndexMap::new(),
            funds: starting_funds,
            park_rating: 500,
            paused: false,
            screen,
            date: GameDate::default(),
            intro_progress: 0,
            delta_ms: 0,
            exit_requested: false,
            seed,
            next_entity: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The session seed this state was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Allocate the next entity ID and insert the entity.
    pub fn spawn_entity(&mut self, position: Pos3) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                position,
                draw_position: position,
                heading: 0,
            },
        );
        id
    }

    /// Remove an entity, preserving the order of the rest.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.entities.shift_remove(&id).is_some()
    }

    /// One step of ambient guest movement, driven by the seeded RNG.
    ///
    /// Iterates entities in spawn order so every peer draws the same
    /// random values for the same entities.
    pub fn wander_step(&mut self) {
        for entity in self.entities.values_mut() {
            let roll = self.rng.next_u32();
            let dx = (roll % 3) as i32 - 1;
            let dy = ((roll >> 8) % 3) as i32 - 1;
            let pos = Pos3::new(
                (entity.position.x + dx).clamp(0, MAP_SIZE - 1),
                (entity.position.y + dy).clamp(0, MAP_SIZE - 1),
                entity.position.z,
            );
            if pos != entity.position {
                entity.heading = direction_of(dx, dy);
                entity.set_position(pos);
            }
        }
    }

    /// Replace this state wholesale (park load). The scheduler only
    /// calls this between ticks; the tweener must be reset alongside.
    pub fn replace(&mut self, new_state: GameState) {
        *self = new_state;
    }

    /// FNV-1a checksum over every authoritative field, in a fixed
    /// order. Excludes `draw_position` (render-only) and
    /// `exit_requested` (local UI intent), and includes the RNG
    /// position so diverging random draws are caught immediately.
    pub fn checksum(&self) -> u64 {
        let mut h = FNV_OFFSET;
        h = fnv1a_u64(h, self.seed);
        h = fnv1a_u32(h, self.next_entity);
        h = fnv1a_i64(h, self.funds);
        h = fnv1a_u32(h, self.park_rating as u32);
        h = fnv1a_u32(h, self.paused as u32);
        h = fnv1a_u32(h, screen_tag(self.screen));
        h = fnv1a_u32(h, self.date.day);
        h = fnv1a_u32(h, self.date.tick_of_day);
        h = fnv1a_u32(h, self.intro_progress);
        let word_pos = self.rng.get_word_pos();
        h = fnv1a_u64(h, word_pos as u64);
        h = fnv1a_u64(h, (word_pos >> 64) as u64);
        for entity in self.entities.values() {
            h = fnv1a_u32(h, entity.id.0);
            h = fnv1a_i32(h, entity.position.x);
            h = fnv1a_i32(h, entity.position.y);
            h = fnv1a_i32(h, entity.position.z);
            h = fnv1a_u32(h, entity.heading as u32);
        }
        h
    }
}

fn screen_tag(screen: ScreenMode) -> u32 {
    match screen {
        ScreenMode::Intro => 0,
        ScreenMode::Title => 1,
        ScreenMode::InGame => 2,
        ScreenMode::Editor => 3,
    }
}

fn direction_of(dx: i32, dy: i32) -> u8 {
    match (dx.signum(), dy.signum()) {
        (0, -1) => 0,
        (1, -1) => 1,
        (1, 0) => 2,
        (1, 1) => 3,
        (0, 1) => 4,
        (-1, 1) => 5,
        (-1, 0) => 6,
        (-1, -1) => 7,
        _ => 0,
    }
}
