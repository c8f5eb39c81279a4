//! Observer traits through which external services watch the simulation.
//!
//! The dispatcher and scheduler notify these hooks; replay capture,
//! replication, and logging are implemented outside the core by
//! whoever registers an observer. The core guarantees *when* hooks
//! fire (exactly once per executed action, after the mutation; once
//! per completed tick), not *what* observers do with them.

use crate::action::Action;
use crate::id::TickId;
use crate::result::ActionResult;

/// Notified after every successfully executed action.
///
/// Fires exactly once per executed action, strictly after the mutation
/// was applied. Rejected and failed actions do not fire this hook.
pub trait ActionObserver {
    /// An action executed successfully during `tick`.
    fn action_executed(&mut self, tick: TickId, action: &Action, result: &ActionResult);
}

/// Notified after every completed simulation tick.
pub trait TickObserver {
    /// Tick `tick` completed; `checksum` is the post-tick state
    /// checksum, or 0 when a `NO_CHECKSUM` action executed this tick.
    fn tick_completed(&mut self, tick: TickId, checksum: u64);
}

/// Convenience bound for services that watch both actions and ticks
/// (replay capture, replication, logging).
pub trait SimObserver: ActionObserver + TickObserver {}

impl<T: ActionObserver + TickObserver> SimObserver for T {}

/// No-op observer for sessions with nothing attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ActionObserver for NullObserver {
    fn action_executed(&mut self, _tick: TickId, _action: &Action, _result: &ActionResult) {}
}

impl TickObserver for NullObserver {
    fn tick_completed(&mut self, _tick: TickId, _checksum: u64) {}
}
