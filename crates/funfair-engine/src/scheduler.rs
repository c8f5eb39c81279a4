//! The frame scheduler: fixed-rate ticks, optional interpolated frames.
//!
//! One [`Scheduler::advance`] call services one host-loop iteration.
//! The elapsed wall-clock sample goes into the accumulators, then the
//! frame runs in one of two modes:
//!
//! * **fixed** — rendering locked to the tick rate. If no tick is owed
//!   yet, the scheduler sleeps the shortfall instead of spinning.
//! * **variable** — rendering uncapped. Each owed tick is bracketed by
//!   tweener snapshots and the frame draws entities at the
//!   interpolated fraction of the tick remainder.
//!
//! Mode is re-selected every frame; on every switch the tweener is
//! restored and reset so no interpolated position outlives the mode
//! that produced it. Interpolation only ever touches render-side
//! positions, so simulation state is identical whichever mode ran.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use funfair_core::action::Action;
use funfair_core::error::SessionError;
use funfair_core::id::TickId;
use funfair_core::result::{ActionReceipt, ActionResult};
use funfair_core::traits::{ActionObserver, SimObserver, TickObserver};

use crate::clock::{TimeAccumulators, Timer, DELTA_MS};
use crate::config::{ConfigError, SessionConfig, MAX_INTERPOLATED_TIME_SCALE};
use crate::dispatch::dispatch_all;
use crate::queue::ActionQueue;
use crate::session::{RemoteSender, Session};
use crate::state::{GameState, ScreenMode, INTRO_TICKS};
use crate::tweener::EntityTweener;

// ── Host seams ───────────────────────────────────────────────────

/// What the scheduler needs from the windowing/rendering host.
///
/// The engine never talks to a graphics API; a host implements this
/// and the scheduler calls it at the right points in the frame.
pub trait UiHost {
    /// Pump input and window events. Called every frame, including
    /// fixed frames that only sleep out a shortfall, so input never
    /// stalls between ticks.
    fn update(&mut self);

    /// Draw one frame of `state`. Returns false when the render
    /// backend failed and needs recreating.
    fn draw(&mut self, state: &GameState) -> bool;

    /// Tear down and rebuild the render backend after a draw failure.
    /// Returns false when recovery is impossible.
    fn recreate_renderer(&mut self) -> bool;

    /// Whether the window is minimised. Minimised hosts fall back to
    /// fixed frames so no work is wasted on invisible interpolation.
    fn minimised(&self) -> bool;
}

/// Host for sessions with no UI at all (dedicated server, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl UiHost for HeadlessHost {
    fn update(&mut self) {}
    fn draw(&mut self, _state: &GameState) -> bool {
        true
    }
    fn recreate_renderer(&mut self) -> bool {
        false
    }
    fn minimised(&self) -> bool {
        false
    }
}

/// How the scheduler waits out the shortfall before the next tick.
pub trait Pacer {
    /// Block for roughly `duration`.
    fn pause(&mut self, duration: Duration);
}

/// Production pacer: puts the simulation thread to sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Pacer that returns immediately. Tests and benchmarks drive
/// simulated time through `advance` instead of waiting it out.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn pause(&mut self, _duration: Duration) {}
}

// ── Finish flag ──────────────────────────────────────────────────

/// One-way latch that stops [`Scheduler::run`].
///
/// Cloneable and thread-safe; any holder (UI quit handler, signal
/// handler) can finish the loop, and once set it never clears.
#[derive(Clone, Debug, Default)]
pub struct FinishFlag(Arc<AtomicBool>);

impl FinishFlag {
    /// A flag that has not been set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the flag. Irreversible.
    pub fn finish(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag has been latched.
    pub fn is_finished(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ── Errors and reports ───────────────────────────────────────────

/// Fatal scheduler failures. Any of these ends the session.
#[derive(Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// The network session failed (desync or closed).
    Session(SessionError),
    /// The render backend failed and could not be recreated.
    RenderBackend,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(err) => write!(f, "session failed: {err}"),
            Self::RenderBackend => write!(f, "render backend lost and not recoverable"),
        }
    }
}

impl Error for SchedulerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            Self::RenderBackend => None,
        }
    }
}

impl From<SessionError> for SchedulerError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

/// What one `advance` call did.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Simulation ticks run this frame.
    pub ticks_run: u32,
    /// Whether a frame was drawn.
    pub drew: bool,
    /// Whether the scheduler slept out a shortfall instead.
    pub slept: bool,
    /// Receipts for every action dispatched this frame.
    pub receipts: Vec<ActionReceipt>,
}

// ── Observer fan-out ─────────────────────────────────────────────

#[derive(Default)]
struct ObserverSet {
    observers: Vec<Box<dyn SimObserver>>,
}

impl ActionObserver for ObserverSet {
    fn action_executed(&mut self, tick: TickId, action: &Action, result: &ActionResult) {
        for observer in &mut self.observers {
            observer.action_executed(tick, action, result);
        }
    }
}

impl TickObserver for ObserverSet {
    fn tick_completed(&mut self, tick: TickId, checksum: u64) {
        for observer in &mut self.observers {
            observer.tick_completed(tick, checksum);
        }
    }
}

// ── Scheduler ────────────────────────────────────────────────────

/// Owns the simulation loop: state, clock, queue, session, tweener.
pub struct Scheduler {
    config: SessionConfig,
    state: GameState,
    accumulators: TimeAccumulators,
    tweener: EntityTweener,
    queue: ActionQueue,
    session: Session,
    observers: ObserverSet,
    pacer: Box<dyn Pacer>,
    finish: FinishFlag,
    current_tick: TickId,
    /// Whether the previous frame ran in variable (interpolated) mode.
    interpolating: bool,
}

impl Scheduler {
    /// Build a scheduler from a validated config, with the default
    /// sleeping pacer. Also returns the sender a transport uses to
    /// deliver remote actions.
    pub fn new(config: SessionConfig) -> Result<(Self, RemoteSender), ConfigError> {
        Self::with_pacer(config, Box::new(ThreadPacer))
    }

    /// Build a scheduler with an explicit pacer.
    pub fn with_pacer(
        config: SessionConfig,
        pacer: Box<dyn Pacer>,
    ) -> Result<(Self, RemoteSender), ConfigError> {
        config.validate()?;
        let (session, sender) = Session::new(config.role, config.local_peer);
        let state = GameState::new(config.seed, config.starting_funds, config.screen);
        Ok((
            Self {
                config,
                state,
                accumulators: TimeAccumulators::new(),
                tweener: EntityTweener::new(),
                queue: ActionQueue::new(),
                session,
                observers: ObserverSet::default(),
                pacer,
                finish: FinishFlag::new(),
                current_tick: TickId(0),
                interpolating: false,
            },
            sender,
        ))
    }

    /// Register an observer for executed actions and completed ticks.
    pub fn add_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.observers.push(observer);
    }

    /// Queue a locally issued action for the next tick.
    pub fn enqueue(&mut self, action: Action) {
        self.queue.enqueue_local(action);
    }

    /// The authoritative state. Read-only; mutation goes through
    /// actions.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The tick the next simulation step will run as.
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// A handle that stops [`run`](Self::run) when latched.
    pub fn finish_flag(&self) -> FinishFlag {
        self.finish.clone()
    }

    /// Replace the whole game state (park load). Only legal between
    /// ticks; the tweener is reset so no stale snapshot survives.
    pub fn replace_state(&mut self, new_state: GameState) {
        self.state.replace(new_state);
        self.tweener.reset();
    }

    /// Drive the loop until the finish flag latches or a fatal error
    /// occurs.
    pub fn run(&mut self, host: &mut dyn UiHost) -> Result<(), SchedulerError> {
        let mut timer = Timer::start();
        while !self.finish.is_finished() {
            let elapsed = timer.elapsed_and_restart();
            self.advance(elapsed, host)?;
        }
        Ok(())
    }

    /// Service one host-loop iteration with an explicit elapsed-time
    /// sample.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        host: &mut dyn UiHost,
    ) -> Result<FrameReport, SchedulerError> {
        self.accumulators.update(elapsed, self.config.time_scale);

        let variable = self.should_run_variable_frame(host);
        if variable != self.interpolating {
            // No interpolated position may outlive its mode.
            if self.interpolating {
                self.tweener.restore(&mut self.state);
            }
            self.tweener.reset();
            self.interpolating = variable;
        }

        let mut report = FrameReport::default();
        if variable {
            self.variable_frame(host, &mut report)?;
        } else {
            self.fixed_frame(host, &mut report)?;
        }
        Ok(report)
    }

    /// Whether this frame should render uncapped with interpolation.
    fn should_run_variable_frame(&self, host: &dyn UiHost) -> bool {
        !self.config.headless
            && self.config.uncap_fps
            && !host.minimised()
            && self.config.time_scale <= MAX_INTERPOLATED_TIME_SCALE
    }

    fn fixed_frame(
        &mut self,
        host: &mut dyn UiHost,
        report: &mut FrameReport,
    ) -> Result<(), SchedulerError> {
        if !self.accumulators.owes_tick() {
            if !self.config.headless {
                host.update();
            }
            let shortfall = self.accumulators.shortfall_ms();
            self.pacer.pause(Duration::from_secs_f32(shortfall / 1000.0));
            report.slept = true;
            return Ok(());
        }
        while self.accumulators.owes_tick() {
            self.accumulators.consume_tick();
            self.tick(report)?;
        }
        if !self.config.headless {
            host.update();
            self.draw(host)?;
            report.drew = true;
        }
        Ok(())
    }

    fn variable_frame(
        &mut self,
        host: &mut dyn UiHost,
        report: &mut FrameReport,
    ) -> Result<(), SchedulerError> {
        while self.accumulators.owes_tick() {
            self.accumulators.consume_tick();
            self.tweener.pre_tick(&self.state);
            self.tick(report)?;
            self.tweener.post_tick(&self.state);
        }
        self.tweener.tween(&mut self.state, self.accumulators.alpha());
        host.update();
        self.draw(host)?;
        report.drew = true;
        Ok(())
    }

    /// One simulation tick: screen step, session pump, action dispatch,
    /// tick hook.
    fn tick(&mut self, report: &mut FrameReport) -> Result<(), SchedulerError> {
        let tick = self.current_tick;
        // Gameplay systems read a fixed delta, never wall-clock jitter.
        self.state.delta_ms = DELTA_MS;

        match self.state.screen {
            ScreenMode::Intro => {
                self.state.intro_progress += 1;
                if self.state.intro_progress >= INTRO_TICKS {
                    self.state.screen = ScreenMode::Title;
                }
            }
            ScreenMode::Title => {
                // The title demo simulates but ignores pause.
                self.state.wander_step();
            }
            ScreenMode::InGame | ScreenMode::Editor => {
                self.state.date.advance();
                if !self.state.paused {
                    self.state.wander_step();
                }
            }
        }

        self.session.pump(&mut self.queue, tick)?;
        let dispatch = dispatch_all(
            &mut self.state,
            &mut self.queue,
            tick,
            self.session.role(),
            &mut self.observers,
        );
        let checksum = if dispatch.suppress_checksum {
            0
        } else {
            self.state.checksum()
        };
        self.observers.tick_completed(tick, checksum);
        report.receipts.extend(dispatch.receipts);
        report.ticks_run += 1;
        self.current_tick = tick.next();
        if self.state.exit_requested {
            self.finish.finish();
        }
        Ok(())
    }

    /// Draw with one recreate-and-retry attempt before giving up.
    fn draw(&mut self, host: &mut dyn UiHost) -> Result<(), SchedulerError> {
        if host.draw(&self.state) {
            return Ok(());
        }
        if host.recreate_renderer() && host.draw(&self.state) {
            return Ok(());
        }
        Err(SchedulerError::RenderBackend)
    }
}
