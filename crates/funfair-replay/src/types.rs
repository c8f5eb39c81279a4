//! Replay data structures.

use funfair_core::action::Action;

use crate::error::ReplayError;

/// Session parameters recorded at the start of every replay file.
///
/// A replay only reproduces the original run when the session is
/// reconstructed from the same seed and configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayHeader {
    /// The session seed.
    pub seed: u64,
    /// Hash of the session configuration the recording ran under.
    pub config_hash: u64,
    /// Tick rate of the recording build. A replay recorded at a
    /// different rate cannot be played back meaningfully.
    pub ticks_per_second: u32,
}

impl ReplayHeader {
    /// Refuse playback when the recording's tick rate differs from the
    /// current build's.
    pub fn verify_tick_rate(&self, current: u32) -> Result<(), ReplayError> {
        if self.ticks_per_second != current {
            return Err(ReplayError::TickRateMismatch {
                recorded: self.ticks_per_second,
                current,
            });
        }
        Ok(())
    }
}

/// One recorded tick: the actions that executed and the resulting
/// checksum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The tick these actions executed in.
    pub tick: u64,
    /// Executed actions, in execution order. Actions flagged
    /// not-replayable are absent.
    pub actions: Vec<Action>,
    /// Post-tick state checksum, or 0 when the tick is exempt from
    /// comparison.
    pub checksum: u64,
}
