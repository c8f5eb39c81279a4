//! Lockstep determinism across peers: same seed plus same actions at
//! the same ticks must yield identical checksums, whatever the network
//! timing looked like.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use funfair_core::action::{keys, Action, ActionKind, ParamValue};
use funfair_core::error::{ActionError, SessionError};
use funfair_core::id::{PeerId, TickId};
use funfair_core::result::ActionResult;
use funfair_core::traits::{ActionObserver, TickObserver};
use funfair_engine::session::SessionRole;
use funfair_engine::{
    HeadlessHost, NoopPacer, RemoteEnvelope, Scheduler, SchedulerError, SessionConfig,
};

#[derive(Clone, Default)]
struct Recorded {
    executed: Vec<(u64, ActionKind)>,
    checksums: Vec<(u64, u64)>,
}

/// Observer sharing its record with the test body.
#[derive(Clone, Default)]
struct Probe(Arc<Mutex<Recorded>>);

impl Probe {
    fn snapshot(&self) -> Recorded {
        self.0.lock().expect("probe lock").clone()
    }
}

impl ActionObserver for Probe {
    fn action_executed(&mut self, tick: TickId, action: &Action, result: &ActionResult) {
        assert!(result.is_ok());
        self.0
            .lock()
            .expect("probe lock")
            .executed
            .push((tick.0, action.kind));
    }
}

impl TickObserver for Probe {
    fn tick_completed(&mut self, tick: TickId, checksum: u64) {
        self.0
            .lock()
            .expect("probe lock")
            .checksums
            .push((tick.0, checksum));
    }
}

fn headless(seed: u64, role: SessionRole) -> (Scheduler, funfair_engine::RemoteSender, Probe) {
    let config = SessionConfig {
        seed,
        role,
        headless: true,
        ..SessionConfig::default()
    };
    let (mut scheduler, sender) =
        Scheduler::with_pacer(config, Box::new(NoopPacer)).expect("valid config");
    let probe = Probe::default();
    scheduler.add_observer(Box::new(probe.clone()));
    (scheduler, sender, probe)
}

fn tick(scheduler: &mut Scheduler) -> Result<(), SchedulerError> {
    scheduler
        .advance(Duration::from_millis(25), &mut HeadlessHost)
        .map(|_| ())
}

fn spawn_at(x: i32, y: i32) -> Action {
    Action::new(ActionKind::SpawnGuest)
        .with_param(keys::X, ParamValue::I32(x))
        .with_param(keys::Y, ParamValue::I32(y))
        .with_param(keys::Z, ParamValue::I32(0))
}

#[test]
fn local_action_executes_once_with_one_hook() {
    let (mut scheduler, _sender, probe) = headless(1, SessionRole::Local);
    scheduler.enqueue(spawn_at(10, 10));
    tick(&mut scheduler).unwrap();
    tick(&mut scheduler).unwrap();

    let record = probe.snapshot();
    assert_eq!(record.executed, vec![(0, ActionKind::SpawnGuest)]);
    assert_eq!(scheduler.state().entities.len(), 1);
}

#[test]
fn peers_running_the_same_script_stay_in_lockstep() {
    // Peer A issues the action locally; peer B receives the identical
    // action over the wire, tagged for the same tick.
    let (mut a, _a_sender, a_probe) = headless(77, SessionRole::Authority);
    let (mut b, b_sender, b_probe) = headless(77, SessionRole::Follower);

    tick(&mut a).unwrap();
    tick(&mut b).unwrap();

    a.enqueue(spawn_at(30, 30));
    b_sender
        .send(RemoteEnvelope {
            tick: TickId(1),
            peer: PeerId(1),
            seq: 0,
            action: spawn_at(30, 30),
        })
        .unwrap();

    for _ in 0..6 {
        tick(&mut a).unwrap();
        tick(&mut b).unwrap();
    }

    let a_checksums = a_probe.snapshot().checksums;
    let b_checksums = b_probe.snapshot().checksums;
    assert_eq!(a_checksums, b_checksums);
    assert!(a_checksums.iter().all(|&(_, c)| c != 0));
}

#[test]
fn replicated_pause_keeps_peers_in_lockstep() {
    // Pausing changes the paused bit and stalls the wander RNG, so the
    // toggle replicates like any gameplay action: peer A issues it
    // locally, peer B receives it for the same tick, and the checksum
    // streams stay identical from then on.
    let (mut a, _a_sender, a_probe) = headless(13, SessionRole::Authority);
    let (mut b, b_sender, b_probe) = headless(13, SessionRole::Follower);

    a.enqueue(spawn_at(20, 20));
    b_sender
        .send(RemoteEnvelope {
            tick: TickId(0),
            peer: PeerId(1),
            seq: 0,
            action: spawn_at(20, 20),
        })
        .unwrap();
    tick(&mut a).unwrap();
    tick(&mut b).unwrap();

    let pause = Action::new(ActionKind::SetPaused).with_param(keys::PAUSED, ParamValue::Bool(true));
    a.enqueue(pause.clone());
    b_sender
        .send(RemoteEnvelope {
            tick: TickId(1),
            peer: PeerId(1),
            seq: 0,
            action: pause,
        })
        .unwrap();

    for _ in 0..5 {
        tick(&mut a).unwrap();
        tick(&mut b).unwrap();
    }

    let a_checksums = a_probe.snapshot().checksums;
    assert_eq!(a_checksums, b_probe.snapshot().checksums);
    // No tick was exempted from comparison by the pause.
    assert!(a_checksums.iter().all(|&(_, c)| c != 0));
    assert!(a.state().paused);
    assert!(b.state().paused);
}

#[test]
fn follower_rejects_privileged_local_action_without_state_change() {
    let (mut scheduler, _sender, probe) = headless(5, SessionRole::Follower);
    let before_funds = scheduler.state().funds;
    scheduler.enqueue(
        Action::new(ActionKind::AdjustFunds).with_param(keys::AMOUNT, ParamValue::I64(9_999)),
    );

    let report = scheduler
        .advance(Duration::from_millis(25), &mut HeadlessHost)
        .unwrap();
    assert_eq!(report.receipts.len(), 1);
    assert!(!report.receipts[0].executed);
    assert_eq!(
        report.receipts[0].result.error,
        Some(ActionError::NotAuthoritative)
    );
    assert_eq!(scheduler.state().funds, before_funds);
    assert!(probe.snapshot().executed.is_empty());
}

#[test]
fn past_tick_envelope_is_a_fatal_desync() {
    let (mut scheduler, sender, _probe) = headless(5, SessionRole::Follower);
    for _ in 0..4 {
        tick(&mut scheduler).unwrap();
    }
    sender
        .send(RemoteEnvelope {
            tick: TickId(1),
            peer: PeerId(2),
            seq: 0,
            action: spawn_at(0, 0),
        })
        .unwrap();

    let err = tick(&mut scheduler).unwrap_err();
    assert_eq!(
        err,
        SchedulerError::Session(SessionError::Desynchronized {
            tagged: TickId(1),
            current: TickId(4),
        })
    );
    // The failure latches: the session never recovers.
    let err = tick(&mut scheduler).unwrap_err();
    assert_eq!(err, SchedulerError::Session(SessionError::Desynchronized {
        tagged: TickId(1),
        current: TickId(4),
    }));
}

#[test]
fn remote_arrival_order_does_not_affect_the_outcome() {
    // The same two per-peer actions for one tick, delivered to two
    // peers in opposite network orders. Both must apply them in
    // (peer, sequence) order and end up with identical state.
    let (mut a, a_sender, a_probe) = headless(11, SessionRole::Follower);
    let (mut b, b_sender, b_probe) = headless(11, SessionRole::Follower);
    let one = RemoteEnvelope {
        tick: TickId(0),
        peer: PeerId(1),
        seq: 0,
        action: spawn_at(1, 1),
    };
    let two = RemoteEnvelope {
        tick: TickId(0),
        peer: PeerId(2),
        seq: 0,
        action: spawn_at(9, 9),
    };
    a_sender.send(one.clone()).unwrap();
    a_sender.send(two.clone()).unwrap();
    b_sender.send(two).unwrap();
    b_sender.send(one).unwrap();
    for _ in 0..3 {
        tick(&mut a).unwrap();
        tick(&mut b).unwrap();
    }
    assert_eq!(a_probe.snapshot().checksums, b_probe.snapshot().checksums);
}
