//! Drains the action queue and runs each action through the
//! query/execute phase machine.
//!
//! Every action passes `Constructed → Queried → {Validated | Rejected}`
//! and, if validated, `→ Executed → Complete`. A failure at any phase
//! produces a receipt and the dispatcher moves on; one bad action never
//! halts the rest of the tick's queue. The action-executed hook fires
//! exactly once per successful execute, strictly after the mutation.

use funfair_core::action::ActionFlags;
use funfair_core::error::ActionError;
use funfair_core::id::TickId;
use funfair_core::result::{ActionReceipt, ActionResult};
use funfair_core::traits::ActionObserver;

use crate::handlers::handler_for;
use crate::queue::{ActionOrigin, ActionPhase, ActionQueue, PendingAction};
use crate::session::SessionRole;
use crate::state::GameState;

/// Everything the dispatcher did during one tick.
#[derive(Debug, Default)]
pub struct TickDispatch {
    /// One receipt per drained action, in execution order.
    pub receipts: Vec<ActionReceipt>,
    /// Whether an executed action was flagged `NO_CHECKSUM`, in which
    /// case the tick reports a zero checksum instead of a real one.
    pub suppress_checksum: bool,
}

/// Drain everything due at `tick` and process it against `state`.
pub fn dispatch_all(
    state: &mut GameState,
    queue: &mut ActionQueue,
    tick: TickId,
    role: SessionRole,
    observer: &mut dyn ActionObserver,
) -> TickDispatch {
    let mut dispatch = TickDispatch::default();
    for mut pending in queue.drain_for(tick) {
        let result = process(state, &mut pending, role);
        let executed = pending.phase == ActionPhase::Executed;
        if executed {
            observer.action_executed(tick, &pending.action, &result);
            if pending.action.kind.flags().contains(ActionFlags::NO_CHECKSUM) {
                dispatch.suppress_checksum = true;
            }
        }
        pending.phase = ActionPhase::Complete;
        dispatch.receipts.push(ActionReceipt {
            action: pending.action,
            result,
            tick,
            executed,
        });
    }
    dispatch
}

/// Run one action through the phase machine.
fn process(state: &mut GameState, pending: &mut PendingAction, role: SessionRole) -> ActionResult {
    let result = query(state, pending, role);
    if pending.phase != ActionPhase::Validated {
        return result;
    }
    execute(state, pending)
}

/// The validation phase. Advances `Constructed → Queried` and then to
/// `Validated` or `Rejected`.
pub fn query(state: &GameState, pending: &mut PendingAction, role: SessionRole) -> ActionResult {
    if pending.phase != ActionPhase::Constructed {
        pending.phase = ActionPhase::Rejected;
        return ActionResult::error(ActionError::InvalidGameState);
    }

    // Authority gate, checked before the handler ever runs. Remote
    // actions were already authorized by the peer that scheduled them.
    if pending.origin == ActionOrigin::Local
        && pending
            .action
            .kind
            .flags()
            .contains(ActionFlags::REQUIRES_AUTHORITY)
        && !role.is_authoritative()
    {
        pending.phase = ActionPhase::Rejected;
        return ActionResult::error_with_message(
            ActionError::NotAuthoritative,
            "requires session authority",
        );
    }

    pending.phase = ActionPhase::Queried;
    let result = (handler_for(pending.action.kind).query)(state, &pending.action);
    pending.phase = if result.is_ok() {
        ActionPhase::Validated
    } else {
        ActionPhase::Rejected
    };
    result
}

/// The mutation phase. Only legal from `Validated`; calling it in any
/// other phase is an `InvalidGameState` failure by itself.
pub fn execute(state: &mut GameState, pending: &mut PendingAction) -> ActionResult {
    if pending.phase != ActionPhase::Validated {
        return ActionResult::error_with_message(
            ActionError::InvalidGameState,
            "execute without successful query",
        );
    }
    let result = (handler_for(pending.action.kind).execute)(state, &pending.action);
    pending.phase = if result.is_ok() {
        ActionPhase::Executed
    } else {
        ActionPhase::Rejected
    };
    result
}
