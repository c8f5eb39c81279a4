//! The Funfair simulation engine.
//!
//! Everything needed to run a deterministic lockstep session: the
//! authoritative [`GameState`], the fixed-rate clock, the action queue
//! and dispatcher, network session plumbing, the render-time entity
//! tweener, and the [`Scheduler`] that ties them into a frame loop.
//!
//! The engine is single-threaded by construction: all state mutation
//! happens on the thread driving [`Scheduler::advance`]. The only
//! cross-thread surface is [`RemoteSender`] (remote action delivery)
//! and [`FinishFlag`] (loop shutdown).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod tweener;

pub use clock::{TimeAccumulators, Timer, DELTA_MS, TICKS_PER_SECOND, TICK_DURATION_MS};
pub use config::{ConfigError, SessionConfig};
pub use dispatch::{dispatch_all, TickDispatch};
pub use queue::{ActionOrigin, ActionPhase, ActionQueue, PendingAction};
pub use scheduler::{
    FinishFlag, FrameReport, HeadlessHost, NoopPacer, Pacer, Scheduler, SchedulerError,
    ThreadPacer, UiHost,
};
pub use session::{RemoteEnvelope, RemoteSender, Session, SessionRole};
pub use state::{Entity, GameDate, GameState, Pos3, ScreenMode};
pub use tweener::EntityTweener;
