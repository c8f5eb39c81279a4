//! Render-time interpolation of entity positions between ticks.
//!
//! The simulation mutates positions 40 times a second; rendering can
//! run much faster. [`EntityTweener`] records each entity's position
//! immediately before and after a tick and, when a frame falls between
//! ticks, writes a linearly interpolated position into the entity's
//! `draw_position`. Authoritative positions are never touched:
//! interpolated positions must never leak into saved, checksummed, or
//! networked state.
//!
//! Snapshot pairs are only valid for the tick they were captured in.
//! Whenever the scheduler leaves interpolated rendering (mode switch,
//! park load), it calls [`restore`](EntityTweener::restore) and
//! [`reset`](EntityTweener::reset) so no entity is left showing a
//! stale in-between position.

use indexmap::IndexMap;

use funfair_core::id::EntityId;

use crate::state::{GameState, Pos3};

/// Records pre/post-tick entity positions and produces blended
/// render positions.
#[derive(Debug, Default)]
pub struct EntityTweener {
    pre: IndexMap<EntityId, Pos3>,
    post: IndexMap<EntityId, Pos3>,
}

impl EntityTweener {
    /// A tweener with no recorded snapshots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every entity's position before the tick runs.
    pub fn pre_tick(&mut self, state: &GameState) {
        self.pre.clear();
        for entity in state.entities.values() {
            self.pre.insert(entity.id, entity.position);
        }
    }

    /// Capture every entity's position after the tick mutated them.
    pub fn post_tick(&mut self, state: &GameState) {
        self.post.clear();
        for entity in state.entities.values() {
            self.post.insert(entity.id, entity.position);
        }
    }

    /// Write interpolated `draw_position`s for the given fraction.
    ///
    /// `alpha == 0.0` reproduces the pre-tick snapshot; `alpha == 1.0`
    /// the post-tick snapshot. Entities that exist only in the post
    /// snapshot (spawned during the tick) snap to their post position.
    /// Authoritative positions are left untouched.
    pub fn tween(&self, state: &mut GameState, alpha: f32) {
        for entity in state.entities.values_mut() {
            let Some(&post) = self.post.get(&entity.id) else {
                continue;
            };
            entity.draw_position = match self.pre.get(&entity.id) {
                Some(&pre) => lerp(pre, post, alpha),
                None => post,
            };
        }
    }

    /// Snap every entity the tweener touched back to its authoritative
    /// position. Called before leaving interpolated rendering so no
    /// render-only position survives the mode switch.
    pub fn restore(&self, state: &mut GameState) {
        for entity in state.entities.values_mut() {
            if self.post.contains_key(&entity.id) || self.pre.contains_key(&entity.id) {
                entity.draw_position = entity.position;
            }
        }
    }

    /// Discard recorded snapshots.
    pub fn reset(&mut self) {
        self.pre.clear();
        self.post.clear();
    }

    /// Whether any snapshot data is currently held.
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

fn lerp(pre: Pos3, post: Pos3, alpha: f32) -> Pos3 {
    Pos3::new(
        lerp_axis(pre.x, post.x, alpha),
        lerp_axis(pre.y, post.y, alpha),
        lerp_axis(pre.z, post.z, alpha),
    )
}

fn lerp_axis(a: i32, b: i32, alpha: f32) -> i32 {
    a + ((b - a) as f32 * alpha).round() as i32
}
