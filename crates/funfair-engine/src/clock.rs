//! Wall-clock sampling and the tick-time accumulators.
//!
//! The simulation advances in fixed 25 ms ticks (40 Hz). Wall-clock
//! time is sampled once per host-loop iteration by [`Timer`] and fed
//! into [`TimeAccumulators`], which decide how many whole ticks are
//! owed. Two independent accumulators run side by side: one scaled by
//! the session time-scale (drives simulation ticks) and one unscaled
//! (drives the real-time tick counter). Both are clamped so a host
//! stall can never trigger an unbounded catch-up burst.

use std::time::{Duration, Instant};

/// Simulation ticks per second. Part of the replay and network
/// compatibility contract; changing it requires a replay format
/// version bump.
pub const TICKS_PER_SECOND: u32 = 40;

/// Duration of one simulation tick in milliseconds.
pub const TICK_DURATION_MS: f32 = 1000.0 / TICKS_PER_SECOND as f32;

/// Accumulator clamp: at most 8 ticks of catch-up after a stall.
pub const MAX_ACCUMULATED_MS: f32 = TICK_DURATION_MS * 8.0;

/// The deterministic delta-time value gameplay systems see each tick,
/// in milliseconds. Always exactly one tick, never wall-clock jitter.
pub const DELTA_MS: u32 = 25;

// ── Timer ────────────────────────────────────────────────────────

/// Measures wall-clock elapsed time per host-loop iteration.
#[derive(Debug)]
pub struct Timer {
    last: Instant,
}

impl Timer {
    /// Start a timer at the current instant.
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Elapsed time since the previous call (or construction), and
    /// restart the measurement.
    pub fn elapsed_and_restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}

// ── TimeAccumulators ─────────────────────────────────────────────

/// The two frame-time accumulators.
#[derive(Debug, Clone)]
pub struct TimeAccumulators {
    /// Tick time in ms, scaled by the session time-scale.
    ticks_ms: f32,
    /// Unscaled real time in ms.
    realtime_ms: f32,
    /// Whole real-time ticks drained from `realtime_ms`.
    real_time_ticks: u64,
}

impl Default for TimeAccumulators {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeAccumulators {
    /// Fresh accumulators holding no time.
    pub fn new() -> Self {
        Self {
            ticks_ms: 0.0,
            realtime_ms: 0.0,
            real_time_ticks: 0,
        }
    }

    /// Fold one elapsed-time sample into both accumulators.
    ///
    /// The tick accumulator receives `elapsed * time_scale`; the
    /// real-time accumulator receives `elapsed` unscaled. Both are
    /// clamped to [`MAX_ACCUMULATED_MS`]. Whole real-time ticks are
    /// drained eagerly.
    pub fn update(&mut self, elapsed: Duration, time_scale: f32) {
        // Converted through f64 so whole-millisecond samples stay
        // exact; a direct f32 conversion leaves 10 ms + 15 ms just
        // short of one tick.
        let elapsed_ms = (elapsed.as_secs_f64() * 1000.0) as f32;

        self.ticks_ms = (self.ticks_ms + elapsed_ms * time_scale).min(MAX_ACCUMULATED_MS);

        self.realtime_ms = (self.realtime_ms + elapsed_ms).min(MAX_ACCUMULATED_MS);
        while self.realtime_ms >= TICK_DURATION_MS {
            self.real_time_ticks += 1;
            self.realtime_ms -= TICK_DURATION_MS;
        }
    }

    /// Whether at least one whole simulation tick is owed.
    pub fn owes_tick(&self) -> bool {
        self.ticks_ms >= TICK_DURATION_MS
    }

    /// Consume one tick's worth of accumulated time.
    pub fn consume_tick(&mut self) {
        self.ticks_ms -= TICK_DURATION_MS;
    }

    /// Time in ms still missing before the next tick is owed.
    /// Zero when a tick is already owed.
    pub fn shortfall_ms(&self) -> f32 {
        (TICK_DURATION_MS - self.ticks_ms).max(0.0)
    }

    /// Interpolation fraction of the tick remainder, clamped to 1.0.
    pub fn alpha(&self) -> f32 {
        (self.ticks_ms / TICK_DURATION_MS).min(1.0)
    }

    /// Milliseconds currently held by the tick accumulator.
    pub fn ticks_ms(&self) -> f32 {
        self.ticks_ms
    }

    /// Whole real-time ticks observed since session start.
    pub fn real_time_ticks(&self) -> u64 {
        self.real_time_ticks
    }
}
