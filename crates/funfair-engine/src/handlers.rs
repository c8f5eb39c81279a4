//! Per-kind action handlers: the query/execute dispatch table.
//!
//! Each [`ActionKind`] maps to a pair of functions. `query` is pure
//! validation against `&GameState` — permissions, parameter shape,
//! target existence, cost preview — with no observable side effect.
//! `execute` performs the mutation, re-validating cheaply first
//! because earlier actions in the same tick may have changed the
//! state since `query` ran. Either the whole mutation applies or none
//! of it does.

use funfair_core::action::{keys, Action, ActionKind};
use funfair_core::error::ActionError;
use funfair_core::result::ActionResult;

use crate::state::{GameState, Pos3, ScreenMode};

/// Cost of placing an attraction, in cents.
pub const ATTRACTION_COST: i64 = 50_000;

/// Park rating gained per placed attraction.
const ATTRACTION_RATING_BONUS: u16 = 10;

/// A query/execute pair for one action kind.
pub struct ActionHandler {
    /// Pure validation; must not mutate observable state.
    pub query: fn(&GameState, &Action) -> ActionResult,
    /// The mutation. Re-validates cheaply, applies all-or-nothing.
    pub execute: fn(&mut GameState, &Action) -> ActionResult,
}

/// Look up the handler for a kind. Total over [`ActionKind`]: the
/// enum is closed, so every kind has exactly one entry here.
pub fn handler_for(kind: ActionKind) -> &'static ActionHandler {
    match kind {
        ActionKind::SpawnGuest => &ActionHandler {
            query: spawn_guest_query,
            execute: spawn_guest_execute,
        },
        ActionKind::MoveEntity => &ActionHandler {
            query: move_entity_query,
            execute: move_entity_execute,
        },
        ActionKind::RemoveEntity => &ActionHandler {
            query: remove_entity_query,
            execute: remove_entity_execute,
        },
        ActionKind::PlaceAttraction => &ActionHandler {
            query: place_attraction_query,
            execute: place_attraction_execute,
        },
        ActionKind::SetPaused => &ActionHandler {
            query: set_paused_query,
            execute: set_paused_execute,
        },
        ActionKind::AdjustFunds => &ActionHandler {
            query: adjust_funds_query,
            execute: adjust_funds_execute,
        },
        ActionKind::EditorPlaceObject => &ActionHandler {
            query: editor_place_query,
            execute: editor_place_execute,
        },
        ActionKind::RequestExit => &ActionHandler {
            query: request_exit_query,
            execute: request_exit_execute,
        },
    }
}

// ── Shared parameter helpers ─────────────────────────────────────

fn position_param(action: &Action) -> Result<Pos3, ActionError> {
    let pos = Pos3::new(
        action.params.i32(keys::X)?,
        action.params.i32(keys::Y)?,
        action.params.i32(keys::Z)?,
    );
    if pos.in_bounds() {
        Ok(pos)
    } else {
        Err(ActionError::InvalidParameters)
    }
}

// ── SpawnGuest ───────────────────────────────────────────────────

fn spawn_guest_query(_state: &GameState, action: &Action) -> ActionResult {
    match position_param(action) {
        Ok(_) => ActionResult::ok(),
        Err(e) => ActionResult::error_with_message(e, "spawn position out of bounds"),
    }
}

fn spawn_guest_execute(state: &mut GameState, action: &Action) -> ActionResult {
    let pos = match position_param(action) {
        Ok(p) => p,
        Err(e) => return ActionResult::error(e),
    };
    let id = state.spawn_entity(pos);
    ActionResult {
        created_entity: Some(id),
        ..ActionResult::ok()
    }
}

// ── MoveEntity ───────────────────────────────────────────────────

fn move_entity_query(state: &GameState, action: &Action) -> ActionResult {
    let id = match action.params.entity(keys::ENTITY) {
        Ok(id) => id,
        Err(e) => return ActionResult::error(e),
    };
    if !state.entities.contains_key(&id) {
        return ActionResult::error_with_message(
            ActionError::InvalidGameState,
            format!("entity {id} does not exist"),
        );
    }
    match position_param(action) {
        Ok(_) => ActionResult::ok(),
        Err(e) => ActionResult::error(e),
    }
}

fn move_entity_execute(state: &mut GameState, action: &Action) -> ActionResult {
    let id = match action.params.entity(keys::ENTITY) {
        Ok(id) => id,
        Err(e) => return ActionResult::error(e),
    };
    let pos = match position_param(action) {
        Ok(p) => p,
        Err(e) => return ActionResult::error(e),
    };
    // The target may have been removed by an earlier action this tick.
    match state.entities.get_mut(&id) {
        Some(entity) => {
            entity.set_position(pos);
            ActionResult::ok()
        }
        None => ActionResult::error_with_message(
            ActionError::InvalidGameState,
            format!("entity {id} does not exist"),
        ),
    }
}

// ── RemoveEntity ─────────────────────────────────────────────────

fn remove_entity_query(state: &GameState, action: &Action) -> ActionResult {
    match action.params.entity(keys::ENTITY) {
        Ok(id) if state.entities.contains_key(&id) => ActionResult::ok(),
        Ok(id) => ActionResult::error_with_message(
            ActionError::InvalidGameState,
            format!("entity {id} does not exist"),
        ),
        Err(e) => ActionResult::error(e),
    }
}

fn remove_entity_execute(state: &mut GameState, action: &Action) -> ActionResult {
    match action.params.entity(keys::ENTITY) {
        Ok(id) if state.remove_entity(id) => ActionResult::ok(),
        Ok(id) => ActionResult::error_with_message(
            ActionError::InvalidGameState,
            format!("entity {id} does not exist"),
        ),
        Err(e) => ActionResult::error(e),
    }
}

// ── PlaceAttraction ──────────────────────────────────────────────

fn place_attraction_query(state: &GameState, action: &Action) -> ActionResult {
    if let Err(e) = action.params.i32(keys::ATTRACTION) {
        return ActionResult::error(e);
    }
    if let Err(e) = position_param(action) {
        return ActionResult::error(e);
    }
    if state.funds < ATTRACTION_COST {
        return ActionResult::error_with_message(
            ActionError::InsufficientResources,
            format!("requires {ATTRACTION_COST} cents"),
        );
    }
    ActionResult::ok_with_cost(ATTRACTION_COST)
}

fn place_attraction_execute(state: &mut GameState, action: &Action) -> ActionResult {
    let pos = match position_param(action) {
        Ok(p) => p,
        Err(e) => return ActionResult::error(e),
    };
    // Funds may have been spent by an earlier action this tick.
    if state.funds < ATTRACTION_COST {
        return ActionResult::error(ActionError::InsufficientResources);
    }
    state.funds -= ATTRACTION_COST;
    state.park_rating = state
        .park_rating
        .saturating_add(ATTRACTION_RATING_BONUS)
        .min(999);
    let id = state.spawn_entity(pos);
    ActionResult {
        cost: ATTRACTION_COST,
        created_entity: Some(id),
        ..ActionResult::ok()
    }
}

// ── SetPaused ────────────────────────────────────────────────────

fn set_paused_query(_state: &GameState, action: &Action) -> ActionResult {
    match action.params.bool(keys::PAUSED) {
        Ok(_) => ActionResult::ok(),
        Err(e) => ActionResult::error(e),
    }
}

fn set_paused_execute(state: &mut GameState, action: &Action) -> ActionResult {
    match action.params.bool(keys::PAUSED) {
        Ok(paused) => {
            state.paused = paused;
            ActionResult::ok()
        }
        Err(e) => ActionResult::error(e),
    }
}

// ── AdjustFunds ──────────────────────────────────────────────────

fn adjust_funds_query(state: &GameState, action: &Action) -> ActionResult {
    match action.params.i64(keys::AMOUNT) {
        Ok(amount) if state.funds.checked_add(amount).is_some() => ActionResult::ok(),
        Ok(_) => ActionResult::error(ActionError::InvalidParameters),
        Err(e) => ActionResult::error(e),
    }
}

fn adjust_funds_execute(state: &mut GameState, action: &Action) -> ActionResult {
    let amount = match action.params.i64(keys::AMOUNT) {
        Ok(a) => a,
        Err(e) => return ActionResult::error(e),
    };
    match state.funds.checked_add(amount) {
        Some(funds) => {
            state.funds = funds;
            ActionResult::ok()
        }
        None => ActionResult::error(ActionError::InvalidParameters),
    }
}

// ── EditorPlaceObject ────────────────────────────────────────────

fn editor_place_query(state: &GameState, action: &Action) -> ActionResult {
    if state.screen != ScreenMode::Editor {
        return ActionResult::error_with_message(
            ActionError::PermissionDenied,
            "only valid in the editor",
        );
    }
    if let Err(e) = action.params.i32(keys::OBJECT) {
        return ActionResult::error(e);
    }
    match position_param(action) {
        Ok(_) => ActionResult::ok(),
        Err(e) => ActionResult::error(e),
    }
}

fn editor_place_execute(state: &mut GameState, action: &Action) -> ActionResult {
    if state.screen != ScreenMode::Editor {
        return ActionResult::error(ActionError::PermissionDenied);
    }
    let pos = match position_param(action) {
        Ok(p) => p,
        Err(e) => return ActionResult::error(e),
    };
    let id = state.spawn_entity(pos);
    ActionResult {
        created_entity: Some(id),
        ..ActionResult::ok()
    }
}

// ── RequestExit ──────────────────────────────────────────────────

fn request_exit_query(state: &GameState, _action: &Action) -> ActionResult {
    if state.exit_requested {
        return ActionResult::error_with_message(
            ActionError::InvalidGameState,
            "exit already requested",
        );
    }
    ActionResult::ok()
}

fn request_exit_execute(state: &mut GameState, _action: &Action) -> ActionResult {
    if state.exit_requested {
        return ActionResult::error(ActionError::InvalidGameState);
    }
    state.exit_requested = true;
    ActionResult::ok()
}
