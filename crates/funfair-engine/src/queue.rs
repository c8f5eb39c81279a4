//! The deterministic action queue.
//!
//! Actions never execute at their call site. They are enqueued here and
//! drained by the dispatcher at the start of the next tick, so every
//! mutation happens at a deterministic point in simulation time.
//!
//! Local actions drain in arrival order. Remote actions are tagged with
//! the tick they must apply at and are held until the local simulation
//! reaches it; within a tick they drain in `(peer, sequence)` order so
//! all peers process them identically regardless of network arrival
//! order.

use std::collections::{BTreeMap, VecDeque};

use smallvec::SmallVec;

use funfair_core::action::Action;
use funfair_core::error::SessionError;
use funfair_core::id::{PeerId, TickId};

/// Where a pending action came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOrigin {
    /// Issued on this peer (UI, script, scenario step).
    Local,
    /// Received from a remote peer, to apply at a tagged tick.
    Remote(PeerId),
}

/// The dispatcher's phase machine for one action.
///
/// Legal transitions: `Constructed → Queried → {Validated | Rejected}`,
/// `Validated → Executed → Complete`. Calling `execute` on an action
/// that is not `Validated` is itself an `InvalidGameState` failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPhase {
    /// Built, not yet validated.
    Constructed,
    /// `query` has run; outcome not yet recorded.
    Queried,
    /// `query` succeeded; eligible for `execute`.
    Validated,
    /// `query` (or a pre-check) failed; will not execute.
    Rejected,
    /// `execute` ran successfully.
    Executed,
    /// Receipt produced; terminal.
    Complete,
}

/// An action waiting in the queue, with its origin and phase.
#[derive(Clone, Debug)]
pub struct PendingAction {
    /// The queued action.
    pub action: Action,
    /// Current phase; the dispatcher advances this.
    pub phase: ActionPhase,
    /// Local or remote provenance.
    pub origin: ActionOrigin,
    /// Monotonic arrival index, used to keep local drain order stable.
    pub arrival: u64,
}

/// A remote action held until its tagged tick.
#[derive(Clone, Debug)]
struct HeldRemote {
    action: Action,
    peer: PeerId,
    seq: u32,
    arrival: u64,
}

/// Holds pending actions until the dispatcher drains them.
#[derive(Debug, Default)]
pub struct ActionQueue {
    local: VecDeque<PendingAction>,
    // A tick rarely carries more than a couple of remote actions.
    remote: BTreeMap<TickId, SmallVec<[HeldRemote; 4]>>,
    next_arrival: u64,
}

impl ActionQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a locally issued action. It will be drained at the start
    /// of the next tick. The queue is unbounded: local issue rate is
    /// bounded by the UI, not by the simulation.
    pub fn enqueue_local(&mut self, action: Action) {
        let arrival = self.bump_arrival();
        self.local.push_back(PendingAction {
            action,
            phase: ActionPhase::Constructed,
            origin: ActionOrigin::Local,
            arrival,
        });
    }

    /// Enqueue a remote action tagged for `tick`.
    ///
    /// Rejects actions tagged for a tick the local simulation has
    /// already executed: past ticks cannot be amended, so such an
    /// arrival means the session has desynchronized.
    pub fn enqueue_remote(
        &mut self,
        action: Action,
        peer: PeerId,
        seq: u32,
        tick: TickId,
        current: TickId,
    ) -> Result<(), SessionError> {
        if tick < current {
            return Err(SessionError::Desynchronized {
                tagged: tick,
                current,
            });
        }
        let arrival = self.bump_arrival();
        self.remote.entry(tick).or_default().push(HeldRemote {
            action,
            peer,
            seq,
            arrival,
        });
        Ok(())
    }

    /// Drain everything due at `tick`: all local actions in arrival
    /// order, then `tick`'s remote actions in `(peer, sequence)` order.
    pub fn drain_for(&mut self, tick: TickId) -> Vec<PendingAction> {
        let mut due: Vec<PendingAction> = self.local.drain(..).collect();

        if let Some(mut held) = self.remote.remove(&tick) {
            held.sort_by_key(|r| (r.peer.0, r.seq));
            due.extend(held.into_iter().map(|r| PendingAction {
                action: r.action,
                phase: ActionPhase::Constructed,
                origin: ActionOrigin::Remote(r.peer),
                arrival: r.arrival,
            }));
        }
        due
    }

    /// Number of local actions waiting.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Number of remote actions held across all future ticks.
    pub fn remote_len(&self) -> usize {
        self.remote.values().map(|held| held.len()).sum()
    }

    /// Whether nothing is queued at all.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    fn bump_arrival(&mut self) -> u64 {
        let arrival = self.next_arrival;
        self.next_arrival += 1;
        arrival
    }
}
