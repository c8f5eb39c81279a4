//! Network session semantics: roles, remote action delivery, desync.
//!
//! The engine does not own sockets. A transport (or a test) gets a
//! [`RemoteSender`] and pushes [`RemoteEnvelope`]s into it from any
//! thread; the scheduler calls [`Session::pump`] once per tick, on the
//! simulation thread, to move everything received so far into the
//! action queue. All validation and execution stay on the simulation
//! thread.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use funfair_core::action::Action;
use funfair_core::error::SessionError;
use funfair_core::id::{PeerId, TickId};

use crate::queue::ActionQueue;

/// Channel capacity for in-flight remote envelopes.
const REMOTE_CHANNEL_CAPACITY: usize = 1024;

/// This peer's role in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRole {
    /// Single-player; no replication, full authority.
    Local,
    /// Multiplayer authority: validates and schedules all mutations.
    Authority,
    /// Multiplayer follower: applies what the authority scheduled.
    Follower,
}

impl SessionRole {
    /// Whether this peer may execute authority-gated actions.
    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Local | Self::Authority)
    }
}

/// One remote action in flight, tagged with the tick it applies at.
#[derive(Clone, Debug)]
pub struct RemoteEnvelope {
    /// The tick the action must execute in.
    pub tick: TickId,
    /// The peer that issued it.
    pub peer: PeerId,
    /// Per-peer sequence number, for deterministic intra-tick order.
    pub seq: u32,
    /// The action itself.
    pub action: Action,
}

/// Thread-safe handle a transport uses to deliver remote actions.
///
/// Cloneable; dropping every clone closes the session's inbound side,
/// which [`Session::pump`] reports as [`SessionError::Closed`] on
/// multiplayer roles.
#[derive(Clone, Debug)]
pub struct RemoteSender {
    tx: Sender<RemoteEnvelope>,
}

impl RemoteSender {
    /// Deliver an envelope. `Err` means the session side is gone.
    pub fn send(&self, envelope: RemoteEnvelope) -> Result<(), SessionError> {
        self.tx.send(envelope).map_err(|_| SessionError::Closed)
    }
}

/// Per-session network state, owned by the scheduler.
#[derive(Debug)]
pub struct Session {
    role: SessionRole,
    local_peer: PeerId,
    rx: Receiver<RemoteEnvelope>,
    /// Latched fatal error. Once set, every later pump fails with it.
    failed: Option<SessionError>,
}

impl Session {
    /// Create a session and the sender a transport feeds it with.
    pub fn new(role: SessionRole, local_peer: PeerId) -> (Self, RemoteSender) {
        let (tx, rx) = crossbeam_channel::bounded(REMOTE_CHANNEL_CAPACITY);
        (
            Self {
                role,
                local_peer,
                rx,
                failed: None,
            },
            RemoteSender { tx },
        )
    }

    /// This peer's role.
    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// This peer's identity.
    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    /// Drain every envelope received so far into the queue.
    ///
    /// Returns how many were queued. A past-tick envelope is fatal:
    /// the error latches and every subsequent call fails with it, since
    /// a desynchronized peer cannot rejoin the lockstep without a full
    /// state transfer.
    pub fn pump(&mut self, queue: &mut ActionQueue, current: TickId) -> Result<usize, SessionError> {
        if let Some(err) = self.failed {
            return Err(err);
        }
        let mut queued = 0;
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => {
                    let action = envelope.action.with_issuer(envelope.peer);
                    if let Err(err) = queue.enqueue_remote(
                        action,
                        envelope.peer,
                        envelope.seq,
                        envelope.tick,
                        current,
                    ) {
                        self.failed = Some(err);
                        return Err(err);
                    }
                    queued += 1;
                }
                Err(TryRecvError::Empty) => return Ok(queued),
                Err(TryRecvError::Disconnected) => {
                    // Every sender dropped. Single-player sessions have
                    // no transport, so a missing sender means nothing;
                    // for multiplayer roles it is the connection-closed
                    // signal, reported once the backlog has drained.
                    if self.role == SessionRole::Local {
                        return Ok(queued);
                    }
                    self.failed = Some(SessionError::Closed);
                    return Err(SessionError::Closed);
                }
            }
        }
    }

    /// Close the session explicitly. Later pumps fail with `Closed`.
    pub fn close(&mut self) {
        self.failed.get_or_insert(SessionError::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funfair_core::action::ActionKind;

    fn envelope(tick: u64, peer: u32, seq: u32) -> RemoteEnvelope {
        RemoteEnvelope {
            tick: TickId(tick),
            peer: PeerId(peer),
            seq,
            action: Action::new(ActionKind::SpawnGuest),
        }
    }

    #[test]
    fn pump_moves_envelopes_into_queue() {
        let (mut session, sender) = Session::new(SessionRole::Follower, PeerId(0));
        let mut queue = ActionQueue::new();

        sender.send(envelope(5, 1, 0)).unwrap();
        sender.send(envelope(5, 1, 1)).unwrap();

        let queued = session.pump(&mut queue, TickId(3)).unwrap();
        assert_eq!(queued, 2);
        assert_eq!(queue.remote_len(), 2);
    }

    #[test]
    fn pump_stamps_issuer_from_envelope() {
        let (mut session, sender) = Session::new(SessionRole::Follower, PeerId(0));
        let mut queue = ActionQueue::new();
        sender.send(envelope(2, 9, 0)).unwrap();
        session.pump(&mut queue, TickId(0)).unwrap();

        let due = queue.drain_for(TickId(2));
        assert_eq!(due[0].action.issuer, Some(PeerId(9)));
    }

    #[test]
    fn past_tick_envelope_latches_desync() {
        let (mut session, sender) = Session::new(SessionRole::Follower, PeerId(0));
        let mut queue = ActionQueue::new();
        sender.send(envelope(2, 1, 0)).unwrap();

        let err = session.pump(&mut queue, TickId(7)).unwrap_err();
        assert_eq!(
            err,
            SessionError::Desynchronized {
                tagged: TickId(2),
                current: TickId(7),
            }
        );
        // Latched: even with nothing pending, the session stays failed.
        assert_eq!(session.pump(&mut queue, TickId(8)), Err(err));
    }

    #[test]
    fn dropped_sender_closes_session() {
        let (mut session, sender) = Session::new(SessionRole::Follower, PeerId(0));
        let mut queue = ActionQueue::new();
        sender.send(envelope(4, 1, 0)).unwrap();
        drop(sender);

        // The backlog drains before the close is reported.
        let err = session.pump(&mut queue, TickId(0)).unwrap_err();
        assert_eq!(err, SessionError::Closed);
        assert_eq!(queue.remote_len(), 1);
    }

    #[test]
    fn local_session_survives_a_dropped_sender() {
        let (mut session, sender) = Session::new(SessionRole::Local, PeerId(0));
        let mut queue = ActionQueue::new();
        drop(sender);
        assert_eq!(session.pump(&mut queue, TickId(0)), Ok(0));
        assert_eq!(session.pump(&mut queue, TickId(1)), Ok(0));
    }

    #[test]
    fn explicit_close_latches() {
        let (mut session, sender) = Session::new(SessionRole::Local, PeerId(0));
        let mut queue = ActionQueue::new();
        session.close();
        assert_eq!(
            session.pump(&mut queue, TickId(0)),
            Err(SessionError::Closed)
        );
        assert!(sender.send(envelope(1, 1, 0)).is_ok());
    }

    #[test]
    fn roles_report_authority() {
        assert!(SessionRole::Local.is_authoritative());
        assert!(SessionRole::Authority.is_authoritative());
        assert!(!SessionRole::Follower.is_authoritative());
    }
}
