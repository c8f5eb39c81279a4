//! Action outcome types.

use crate::action::Action;
use crate::error::ActionError;
use crate::id::{EntityId, TickId};

/// Outcome of an action's `query` or `execute` phase.
///
/// A failing result carries a specific error kind and an optional
/// human-readable explanation for whoever issued the action (UI
/// message, network rejection reply). A successful `query` carries the
/// computed cost preview; a successful `execute` may additionally carry
/// the identity of a created entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    /// The failure kind, or `None` on success.
    pub error: Option<ActionError>,
    /// Optional human-readable explanation of a failure.
    pub message: Option<String>,
    /// Cost in cents, computed during validation.
    pub cost: i64,
    /// Entity created by `execute`, if any.
    pub created_entity: Option<EntityId>,
}

impl ActionResult {
    /// A successful result with zero cost.
    pub fn ok() -> Self {
        Self {
            error: None,
            message: None,
            cost: 0,
            created_entity: None,
        }
    }

    /// A successful result carrying a cost preview.
    pub fn ok_with_cost(cost: i64) -> Self {
        Self {
            cost,
            ..Self::ok()
        }
    }

    /// A failure with an error kind only.
    pub fn error(kind: ActionError) -> Self {
        Self {
            error: Some(kind),
            message: None,
            cost: 0,
            created_entity: None,
        }
    }

    /// A failure with an error kind and explanation.
    pub fn error_with_message(kind: ActionError, message: impl Into<String>) -> Self {
        Self {
            error: Some(kind),
            message: Some(message.into()),
            cost: 0,
            created_entity: None,
        }
    }

    /// Whether the action succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ActionError> for ActionResult {
    fn from(kind: ActionError) -> Self {
        Self::error(kind)
    }
}

/// Final per-action record produced by the dispatcher.
///
/// One receipt is produced for every action drained in a tick, whether
/// it executed or was rejected. Receipts are how outcomes reach the
/// issuing caller without halting the rest of the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReceipt {
    /// The action this receipt describes.
    pub action: Action,
    /// The final result (from `execute`, or from the phase that
    /// rejected it).
    pub result: ActionResult,
    /// The tick during which the action was processed.
    pub tick: TickId,
    /// Whether the action reached `execute` and succeeded.
    pub executed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_result_has_no_error() {
        let r = ActionResult::ok();
        assert!(r.is_ok());
        assert_eq!(r.cost, 0);
        assert_eq!(r.created_entity, None);
    }

    #[test]
    fn cost_preview_preserved() {
        let r = ActionResult::ok_with_cost(50_000);
        assert!(r.is_ok());
        assert_eq!(r.cost, 50_000);
    }

    #[test]
    fn error_result_carries_kind_and_message() {
        let r = ActionResult::error_with_message(ActionError::InsufficientResources, "need $500");
        assert!(!r.is_ok());
        assert_eq!(r.error, Some(ActionError::InsufficientResources));
        assert_eq!(r.message.as_deref(), Some("need $500"));
    }
}
