//! Divergence detection between a recording and a live run.
//!
//! Checksums of 0 mark ticks exempt from comparison (a checksum-exempt
//! action executed there) and are skipped on either side.

use std::io::Read;

use funfair_core::action::Action;

use crate::error::ReplayError;
use crate::reader::ReplayReader;

/// The first tick at which a re-run simulation no longer matches the
/// recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divergence {
    /// The tick at which the checksums differ.
    pub tick: u64,
    /// Checksum from the replay file.
    pub recorded: u64,
    /// Checksum computed by the live run.
    pub live: u64,
}

/// Compare two per-tick checksum sequences, skipping exempt ticks.
///
/// Both slices are `(tick, checksum)` pairs; only ticks present in
/// both are compared. Returns the first mismatch, if any.
pub fn first_divergence(recorded: &[(u64, u64)], live: &[(u64, u64)]) -> Option<Divergence> {
    let mut live_iter = live.iter().peekable();
    for &(tick, recorded_checksum) in recorded {
        if recorded_checksum == 0 {
            continue;
        }
        while live_iter.peek().is_some_and(|&&(t, _)| t < tick) {
            live_iter.next();
        }
        match live_iter.peek() {
            Some(&&(t, live_checksum)) if t == tick => {
                if live_checksum != 0 && live_checksum != recorded_checksum {
                    return Some(Divergence {
                        tick,
                        recorded: recorded_checksum,
                        live: live_checksum,
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Replay a recording through a caller-provided step function and
/// compare checksums at every tick.
///
/// The `step_fn` closure receives each frame's tick and actions, runs
/// the simulation one tick, and returns the post-tick checksum. The
/// closure-based API keeps this crate free of any dependency on the
/// engine.
///
/// Returns `Ok(None)` when every compared tick matches, or
/// `Ok(Some(divergence))` at the first mismatch.
pub fn replay_and_compare<R: Read>(
    mut reader: ReplayReader<R>,
    step_fn: &mut dyn FnMut(u64, Vec<Action>) -> Result<u64, ReplayError>,
) -> Result<Option<Divergence>, ReplayError> {
    while let Some(frame) = reader.next_frame()? {
        let live = step_fn(frame.tick, frame.actions)?;
        if frame.checksum == 0 || live == 0 {
            continue;
        }
        if live != frame.checksum {
            return Ok(Some(Divergence {
                tick: frame.tick,
                recorded: frame.checksum,
                live,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_frame, encode_header};
    use crate::types::{Frame, ReplayHeader};

    fn recording(checksums: &[u64]) -> Vec<u8> {
        let header = ReplayHeader {
            seed: 1,
            config_hash: 0,
            ticks_per_second: 40,
        };
        let mut buf = Vec::new();
        encode_header(&mut buf, &header).unwrap();
        for (tick, &checksum) in checksums.iter().enumerate() {
            let frame = Frame {
                tick: tick as u64,
                actions: vec![],
                checksum,
            };
            encode_frame(&mut buf, &frame).unwrap();
        }
        buf
    }

    #[test]
    fn matching_sequences_have_no_divergence() {
        let recorded = [(0, 10), (1, 20), (2, 30)];
        let live = [(0, 10), (1, 20), (2, 30)];
        assert_eq!(first_divergence(&recorded, &live), None);
    }

    #[test]
    fn first_mismatch_is_reported() {
        let recorded = [(0, 10), (1, 20), (2, 30)];
        let live = [(0, 10), (1, 99), (2, 77)];
        assert_eq!(
            first_divergence(&recorded, &live),
            Some(Divergence {
                tick: 1,
                recorded: 20,
                live: 99,
            })
        );
    }

    #[test]
    fn exempt_ticks_are_skipped() {
        // Tick 1 is exempt on the recorded side, tick 2 on the live
        // side; neither may be flagged as divergence.
        let recorded = [(0, 10), (1, 0), (2, 30)];
        let live = [(0, 10), (1, 55), (2, 0)];
        assert_eq!(first_divergence(&recorded, &live), None);
    }

    #[test]
    fn replay_and_compare_matches_clean_run() {
        let buf = recording(&[11, 22, 33]);
        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let result = replay_and_compare(reader, &mut |tick, actions| {
            assert!(actions.is_empty());
            Ok((tick + 1) * 11)
        })
        .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn replay_and_compare_detects_divergence() {
        let buf = recording(&[11, 22, 33]);
        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let result = replay_and_compare(reader, &mut |tick, _actions| {
            Ok(if tick == 2 { 999 } else { (tick + 1) * 11 })
        })
        .unwrap();
        assert_eq!(
            result,
            Some(Divergence {
                tick: 2,
                recorded: 33,
                live: 999,
            })
        );
    }

    #[test]
    fn replay_and_compare_skips_exempt_frames() {
        let buf = recording(&[11, 0, 33]);
        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let result = replay_and_compare(reader, &mut |tick, _actions| {
            Ok(if tick == 1 { 424242 } else { (tick + 1) * 11 })
        })
        .unwrap();
        assert_eq!(result, None);
    }
}
