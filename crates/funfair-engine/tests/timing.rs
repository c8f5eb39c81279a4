//! Timing properties of the accumulators and the scheduler: tick
//! counts depend on total elapsed time, not on how the host loop
//! sliced it, and stalls never cause unbounded catch-up.

use std::time::Duration;

use proptest::prelude::*;

use funfair_engine::{
    HeadlessHost, NoopPacer, Scheduler, SessionConfig, TimeAccumulators, TICK_DURATION_MS,
};

fn drain(acc: &mut TimeAccumulators) -> u64 {
    let mut ticks = 0;
    while acc.owes_tick() {
        acc.consume_tick();
        ticks += 1;
    }
    ticks
}

proptest! {
    /// Feeding the same samples in different groupings yields the same
    /// total tick count, as long as each frame drains its owed ticks
    /// and no merged sample reaches the clamp.
    #[test]
    fn tick_count_is_independent_of_frame_slicing(
        chunks in prop::collection::vec(0u64..80, 1..40),
    ) {
        let mut per_chunk = TimeAccumulators::new();
        let mut ticks_a = 0;
        for &ms in &chunks {
            per_chunk.update(Duration::from_millis(ms), 1.0);
            ticks_a += drain(&mut per_chunk);
        }

        // Same samples, merged pairwise.
        let mut merged = TimeAccumulators::new();
        let mut ticks_b = 0;
        for pair in chunks.chunks(2) {
            let ms: u64 = pair.iter().sum();
            merged.update(Duration::from_millis(ms), 1.0);
            ticks_b += drain(&mut merged);
        }

        prop_assert_eq!(ticks_a, ticks_b);
    }

    /// One update never owes more than the 8-tick clamp, whatever the
    /// stall length or time scale.
    #[test]
    fn catch_up_is_bounded(
        stall_ms in 0u64..60_000,
        scale in 0.25f32..=4.0,
    ) {
        let mut acc = TimeAccumulators::new();
        acc.update(Duration::from_millis(stall_ms), scale);
        prop_assert!(drain(&mut acc) <= 8);
    }

    /// The real-time tick counter tracks unscaled wall time.
    #[test]
    fn real_time_ticks_ignore_the_time_scale(
        frames in prop::collection::vec(1u64..30, 1..30),
        scale in 0.25f32..=4.0,
    ) {
        let mut scaled = TimeAccumulators::new();
        let mut unscaled = TimeAccumulators::new();
        for &ms in &frames {
            scaled.update(Duration::from_millis(ms), scale);
            unscaled.update(Duration::from_millis(ms), 1.0);
            drain(&mut scaled);
            drain(&mut unscaled);
        }
        prop_assert_eq!(scaled.real_time_ticks(), unscaled.real_time_ticks());
    }
}

#[test]
fn leftover_time_carries_into_the_next_frame() {
    let mut acc = TimeAccumulators::new();
    acc.update(Duration::from_millis(26), 1.0);
    assert_eq!(drain(&mut acc), 1);
    // 1 ms remains; 24 more completes the next tick.
    acc.update(Duration::from_millis(24), 1.0);
    assert_eq!(drain(&mut acc), 1);
    assert!(acc.ticks_ms() < TICK_DURATION_MS);
}

#[test]
fn scheduler_runs_wall_time_divided_by_tick_duration() {
    let (mut scheduler, _sender) = Scheduler::with_pacer(
        SessionConfig {
            headless: true,
            ..SessionConfig::default()
        },
        Box::new(NoopPacer),
    )
    .expect("valid config");

    let mut host = HeadlessHost;
    let mut total = 0;
    // 40 frames of 30 ms: 1200 ms of wall time, 48 ticks.
    for _ in 0..40 {
        let report = scheduler
            .advance(Duration::from_millis(30), &mut host)
            .expect("advance");
        total += report.ticks_run;
    }
    assert_eq!(total, 48);
}

#[test]
fn double_speed_runs_twice_as_many_ticks() {
    let run = |time_scale: f32| {
        let (mut scheduler, _sender) = Scheduler::with_pacer(
            SessionConfig {
                time_scale,
                headless: true,
                ..SessionConfig::default()
            },
            Box::new(NoopPacer),
        )
        .expect("valid config");
        let mut host = HeadlessHost;
        let mut total = 0;
        for _ in 0..20 {
            let report = scheduler
                .advance(Duration::from_millis(25), &mut host)
                .expect("advance");
            total += report.ticks_run;
        }
        total
    };

    assert_eq!(run(1.0), 20);
    assert_eq!(run(2.0), 40);
}
